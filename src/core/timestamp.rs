//! Timestamp formatting utilities
//!
//! Provides the timestamp layouts used by the formatters. Supports RFC 3339
//! at second and nanosecond precision, ISO 8601 with milliseconds, Unix
//! timestamps, and custom strftime patterns.

use super::error::{LoggerError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Timestamp layout options
///
/// # Examples
///
/// ```
/// use rust_log_dispatch::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::Rfc3339;
/// let timestamp = format.format(&Utc::now()).unwrap();
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 at second precision: `2025-01-08T10:30:45Z`
    ///
    /// Round-trippable date-time with offset. Default for text output.
    #[default]
    Rfc3339,

    /// RFC 3339 at nanosecond precision: `2025-01-08T10:30:45.123456789Z`
    ///
    /// Default for JSON output.
    Rfc3339Nanos,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601Millis,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    ///
    /// ```
    /// use rust_log_dispatch::TimestampFormat;
    ///
    /// // Apache log format
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Render `datetime` in this layout
    ///
    /// # Errors
    ///
    /// Returns a formatter error when a custom pattern cannot be rendered.
    pub fn format(&self, datetime: &DateTime<Utc>) -> Result<String> {
        let rendered = match self {
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimestampFormat::Rfc3339Nanos => {
                datetime.to_rfc3339_opts(SecondsFormat::Nanos, true)
            }
            TimestampFormat::Iso8601Millis => {
                datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
            }
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => {
                let mut out = String::new();
                write!(out, "{}", datetime.format(pattern)).map_err(|_| {
                    LoggerError::formatter(
                        "timestamp",
                        format!("invalid strftime pattern '{}'", pattern),
                    )
                })?;
                out
            }
        };
        Ok(rendered)
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}
