//! Formatters turning events into bytes
//!
//! A formatter is a pure function of the event: it holds only immutable
//! configuration and is shared freely across threads. Three layouts are
//! provided:
//! - Text: `2025-01-08T10:30:45Z [INFO] Request processed user=alice `
//! - Json: `{"timestamp":"...","level":"INFO","message":"Request processed","user":"alice"}`
//! - Logfmt: `timestamp=... level=INFO message="Request processed" user="alice"`
//!
//! Every layout ends with a single newline.

use super::error::{LoggerError, Result};
use super::event::Event;
use super::fields::{merge_json_maps, FieldValue};
use super::timestamp::TimestampFormat;
use std::fmt;
use std::io::Write;

pub trait Formatter: Send + Sync {
    /// Encode `event`. Must not perform I/O or touch shared mutable state.
    fn format(&self, event: &Event) -> Result<Vec<u8>>;

    fn name(&self) -> &str {
        "formatter"
    }
}

impl fmt::Debug for dyn Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Formatter({})", self.name())
    }
}

/// Fixed-layout line used when a formatter fails: `timestamp [LEVEL] message`
#[must_use]
pub fn fallback_line(event: &Event) -> Vec<u8> {
    // Rfc3339 never fails.
    let timestamp = TimestampFormat::Rfc3339
        .format(&event.timestamp)
        .unwrap_or_default();
    format!("{} [{}] {}\n", timestamp, event.level_name, event.message).into_bytes()
}

/// Format with `formatter`, or fall back to [`fallback_line`] on error
#[must_use]
pub fn render(formatter: &dyn Formatter, event: &Event) -> Vec<u8> {
    formatter
        .format(event)
        .unwrap_or_else(|_| fallback_line(event))
}

/// Human-readable text
///
/// Fields follow the message as `key=value ` pairs in unspecified order.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    timestamp_format: TimestampFormat,
}

impl TextFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timestamp format
    ///
    /// ```
    /// use rust_log_dispatch::{TextFormatter, TimestampFormat};
    ///
    /// let formatter = TextFormatter::new()
    ///     .with_timestamp_format(TimestampFormat::Custom("%d %b %y %H:%M".to_string()));
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Formatter for TextFormatter {
    fn format(&self, event: &Event) -> Result<Vec<u8>> {
        let timestamp = self.timestamp_format.format(&event.timestamp)?;

        let mut out = Vec::with_capacity(64 + event.message.len());
        write!(out, "{} [{}] {}", timestamp, event.level_name, event.message)?;
        if !event.fields.is_empty() {
            out.push(b' ');
            for (key, value) in event.fields.iter() {
                write!(out, "{}={} ", key, value)?;
            }
        }
        out.push(b'\n');
        Ok(out)
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// One JSON object per line
///
/// Fields are merged into the top level last, recursively, so a field named
/// `level`, `message` or `timestamp` replaces the built-in key.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
    pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::Rfc3339Nanos,
            pretty: false,
        }
    }
}

impl JsonFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn timestamp_value(&self, event: &Event) -> Result<serde_json::Value> {
        let value = match self.timestamp_format {
            TimestampFormat::Unix => serde_json::Value::Number(event.timestamp.timestamp().into()),
            TimestampFormat::UnixMillis => {
                serde_json::Value::Number(event.timestamp.timestamp_millis().into())
            }
            _ => serde_json::Value::String(self.timestamp_format.format(&event.timestamp)?),
        };
        Ok(value)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, event: &Event) -> Result<Vec<u8>> {
        let mut json_obj = serde_json::Map::new();
        json_obj.insert("timestamp".to_string(), self.timestamp_value(event)?);
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(event.level_name.clone()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(event.message.clone()),
        );
        merge_json_maps(&mut json_obj, event.fields.to_json_map());

        let value = serde_json::Value::Object(json_obj);
        let mut out = if self.pretty {
            serde_json::to_vec_pretty(&value)?
        } else {
            serde_json::to_vec(&value)?
        };
        out.push(b'\n');
        Ok(out)
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Logfmt key=value pairs, compatible with log aggregation tools
#[derive(Debug, Clone, Default)]
pub struct LogfmtFormatter {
    timestamp_format: TimestampFormat,
}

impl LogfmtFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Escape a logfmt key (remove spaces and special chars)
    fn escape_key(key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.')
            .collect()
    }

    /// Quote a logfmt value only if it needs it
    fn escape_value(value: &str) -> String {
        if value.is_empty() || value.contains([' ', '"', '=']) {
            Self::quote(value)
        } else {
            value.to_string()
        }
    }

    fn quote(value: &str) -> String {
        format!(
            "\"{}\"",
            value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
        )
    }
}

impl Formatter for LogfmtFormatter {
    fn format(&self, event: &Event) -> Result<Vec<u8>> {
        let timestamp = self.timestamp_format.format(&event.timestamp)?;

        let mut parts = vec![
            format!("timestamp={}", Self::escape_value(&timestamp)),
            format!("level={}", Self::escape_value(&event.level_name)),
            format!("message={}", Self::quote(&event.message)),
        ];

        for (key, value) in event.fields.iter() {
            let formatted = match value {
                FieldValue::String(s) => Self::quote(s),
                FieldValue::List(_) | FieldValue::Map(_) => {
                    let json = serde_json::to_string(&value.to_json_value())
                        .map_err(|e| LoggerError::formatter("logfmt", e.to_string()))?;
                    Self::quote(&json)
                }
                other => other.to_string(),
            };
            parts.push(format!("{}={}", Self::escape_key(key), formatted));
        }

        let mut out = parts.join(" ").into_bytes();
        out.push(b'\n');
        Ok(out)
    }

    fn name(&self) -> &str {
        "logfmt"
    }
}
