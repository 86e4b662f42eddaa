//! Declarative logger construction
//!
//! A [`LoggerConfig`] lists transports in fan-out order. Each entry names a
//! transport type, a minimum level, a formatter kind and type-specific
//! options:
//!
//! ```yaml
//! transports:
//!   - type: console
//!     level: DEBUG
//!     formatter: text
//!     options: { stderr: true }
//!   - type: file
//!     level: WARN
//!     formatter: json
//!     options: { path: /var/log/app.log }
//!   - type: syslog
//!     level: ERROR
//!     options: { tag: myapp, facility: local0 }
//! ```
//!
//! Construction is all-or-nothing: if any entry is invalid no logger is
//! returned and transports opened for earlier entries are closed.

use crate::core::{
    Formatter, JsonFormatter, LevelRegistry, LogfmtFormatter, Logger, LoggerError, Result,
    TextFormatter, Transport,
};
use crate::transports::{ConsoleTarget, ConsoleTransport};
#[cfg(feature = "file")]
use crate::transports::{FileTransport, RotatingFileTransport, RotationPolicy, RotationStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
#[cfg(feature = "file")]
use std::time::Duration;
#[cfg(all(feature = "syslog", unix))]
use crate::transports::{parse_facility, SyslogTransport};

/// Tag used by syslog entries that do not name one
pub const DEFAULT_SYSLOG_TAG: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default, alias = "Transports")]
    pub transports: Vec<TransportConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// `console`, `file`, `rotating_file` or `syslog`
    #[serde(rename = "type", alias = "Type")]
    pub kind: String,

    /// Level name, resolved with the logger's registry (unknown names mean INFO)
    #[serde(default, alias = "Level")]
    pub level: String,

    /// `text` (or empty), `json` or `logfmt`
    #[serde(default, alias = "Formatter")]
    pub formatter: String,

    #[serde(default, alias = "Options")]
    pub options: HashMap<String, serde_json::Value>,
}

impl LoggerConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&read_config(path.as_ref())?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&read_config(path.as_ref())?)
    }

    /// Build a logger using the process-wide level registry
    pub fn build(&self) -> Result<Logger> {
        self.build_with_registry(Arc::clone(LevelRegistry::global()))
    }

    /// Build a logger whose level names come from `registry`
    pub fn build_with_registry(&self, registry: Arc<LevelRegistry>) -> Result<Logger> {
        let mut built: Vec<Arc<dyn Transport>> = Vec::with_capacity(self.transports.len());

        for (index, entry) in self.transports.iter().enumerate() {
            match entry.build(&registry) {
                Ok(transport) => built.push(transport),
                Err(e) => {
                    close_all(&built);
                    return Err(match e {
                        LoggerError::InvalidConfiguration { component, message } => {
                            LoggerError::config(format!("transports[{}].{}", index, component), message)
                        }
                        other => other,
                    });
                }
            }
        }

        let logger = Logger::with_registry(registry);
        for transport in built {
            logger.add_transport(transport);
        }
        Ok(logger)
    }
}

impl Logger {
    /// See [`LoggerConfig::build`]
    pub fn from_config(config: &LoggerConfig) -> Result<Logger> {
        config.build()
    }
}

impl TransportConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = formatter.into();
        self
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    fn build(&self, registry: &LevelRegistry) -> Result<Arc<dyn Transport>> {
        let level = registry.parse(&self.level);
        let formatter = build_formatter(&self.formatter)?;

        match self.kind.as_str() {
            "console" => {
                let target = if self.bool_option("stderr")?.unwrap_or(false) {
                    ConsoleTarget::Stderr
                } else {
                    ConsoleTarget::Stdout
                };
                Ok(Arc::new(
                    ConsoleTransport::new(level)
                        .with_target(target)
                        .with_formatter(formatter)
                        .with_colors(self.bool_option("colors")?.unwrap_or(false)),
                ))
            }
            "file" => self.build_file(level, formatter),
            "rotating_file" => self.build_rotating_file(level, formatter),
            "syslog" => self.build_syslog(level, formatter),
            other => Err(LoggerError::unknown_transport(other)),
        }
    }

    #[cfg(feature = "file")]
    fn build_file(&self, level: crate::Level, formatter: Arc<dyn Formatter>) -> Result<Arc<dyn Transport>> {
        let path = self.required_path()?;
        Ok(Arc::new(FileTransport::open(path, level)?.with_formatter(formatter)))
    }

    #[cfg(feature = "file")]
    fn build_rotating_file(
        &self,
        level: crate::Level,
        formatter: Arc<dyn Formatter>,
    ) -> Result<Arc<dyn Transport>> {
        let path = self.required_path()?;

        let mut policy = RotationPolicy::new();
        if let Some(max_mb) = self.u64_option("max_size_mb")? {
            policy = policy.with_strategy(RotationStrategy::megabytes(max_mb));
        }
        if let Some(backups) = self.u64_option("max_backups")? {
            policy = policy.with_max_backups(usize::try_from(backups).unwrap_or(usize::MAX));
        }
        if let Some(hours) = self.u64_option("max_age_hours")?.filter(|h| *h > 0) {
            policy = policy.with_max_age(Duration::from_secs(hours.saturating_mul(3600)));
        }
        policy = policy.with_compression(self.bool_option("compress")?.unwrap_or(false));

        Ok(Arc::new(
            RotatingFileTransport::with_policy(path, level, policy)?.with_formatter(formatter),
        ))
    }

    #[cfg(not(feature = "file"))]
    fn build_file(&self, _level: crate::Level, _formatter: Arc<dyn Formatter>) -> Result<Arc<dyn Transport>> {
        Err(LoggerError::config("file", "built without the `file` feature"))
    }

    #[cfg(not(feature = "file"))]
    fn build_rotating_file(
        &self,
        _level: crate::Level,
        _formatter: Arc<dyn Formatter>,
    ) -> Result<Arc<dyn Transport>> {
        Err(LoggerError::config("rotating_file", "built without the `file` feature"))
    }

    #[cfg(all(feature = "syslog", unix))]
    fn build_syslog(&self, level: crate::Level, formatter: Arc<dyn Formatter>) -> Result<Arc<dyn Transport>> {
        let tag = self
            .str_option("tag")?
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SYSLOG_TAG);
        let facility_name = self.str_option("facility")?.unwrap_or("user");
        let facility = parse_facility(facility_name).ok_or_else(|| {
            LoggerError::config(
                format!("{}.options.facility", self.kind),
                format!("unknown syslog facility '{}'", facility_name),
            )
        })?;

        let transport = match self.str_option("socket")? {
            Some(socket) => SyslogTransport::connect_socket(socket, tag, facility, level)?,
            None => SyslogTransport::connect(tag, facility, level)?,
        };
        Ok(Arc::new(transport.with_formatter(formatter)))
    }

    #[cfg(not(all(feature = "syslog", unix)))]
    fn build_syslog(&self, _level: crate::Level, _formatter: Arc<dyn Formatter>) -> Result<Arc<dyn Transport>> {
        Err(LoggerError::config(
            "syslog",
            "built without the `syslog` feature or on a platform without Unix sockets",
        ))
    }

    #[cfg(feature = "file")]
    fn required_path(&self) -> Result<&str> {
        match self.str_option("path")? {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(LoggerError::config(
                format!("{}.options.path", self.kind),
                "a non-empty path is required",
            )),
        }
    }

    #[cfg(any(feature = "file", all(feature = "syslog", unix)))]
    fn str_option(&self, key: &str) -> Result<Option<&str>> {
        match self.options.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.option_type_error(key, "a string", other)),
        }
    }

    fn bool_option(&self, key: &str) -> Result<Option<bool>> {
        match self.options.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.option_type_error(key, "a boolean", other)),
        }
    }

    #[cfg(feature = "file")]
    fn u64_option(&self, key: &str) -> Result<Option<u64>> {
        match self.options.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.option_type_error(key, "a non-negative integer", value)),
        }
    }

    fn option_type_error(&self, key: &str, expected: &str, found: &serde_json::Value) -> LoggerError {
        LoggerError::config(
            format!("{}.options.{}", self.kind, key),
            format!("expected {}, found {}", expected, found),
        )
    }
}

fn build_formatter(kind: &str) -> Result<Arc<dyn Formatter>> {
    match kind.to_ascii_lowercase().as_str() {
        "" | "text" => Ok(Arc::new(TextFormatter::new())),
        "json" => Ok(Arc::new(JsonFormatter::new())),
        "logfmt" => Ok(Arc::new(LogfmtFormatter::new())),
        other => Err(LoggerError::config(
            "formatter",
            format!("unknown formatter kind '{}'", other),
        )),
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        LoggerError::io_operation(
            "read logger configuration",
            format!("Failed to read '{}'", path.display()),
            e,
        )
    })
}

fn close_all(transports: &[Arc<dyn Transport>]) {
    for transport in transports {
        if let Some(closeable) = transport.closeable() {
            if let Err(e) = closeable.close() {
                eprintln!(
                    "[LOGGER WARNING] Failed to close '{}' after configuration error: {}",
                    transport.name(),
                    e
                );
            }
        }
    }
}
