//! System log transport
//!
//! Sends each event as one RFC 3164 message over a Unix socket, either the
//! platform default (`/dev/log` and friends) or an explicit path. The event
//! level picks the syslog severity; the facility and tag are fixed per
//! transport.

use crate::core::{
    render, Closeable, Event, Formatter, Level, LoggerError, RawSink, Result, TextFormatter,
    Transport,
};
use ::syslog::{Facility, Formatter3164, LoggerBackend};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

type Connection = ::syslog::Logger<LoggerBackend, Formatter3164>;

/// Resolve a facility name such as `user`, `daemon` or `local0`
///
/// Matching is case-insensitive and accepts an optional `log_` prefix.
#[must_use]
pub fn parse_facility(name: &str) -> Option<Facility> {
    let lower = name.to_ascii_lowercase();
    let bare = lower.strip_prefix("log_").unwrap_or(&lower);
    let facility = match bare {
        "kern" => Facility::LOG_KERN,
        "user" => Facility::LOG_USER,
        "mail" => Facility::LOG_MAIL,
        "daemon" => Facility::LOG_DAEMON,
        "auth" => Facility::LOG_AUTH,
        "syslog" => Facility::LOG_SYSLOG,
        "lpr" => Facility::LOG_LPR,
        "news" => Facility::LOG_NEWS,
        "uucp" => Facility::LOG_UUCP,
        "cron" => Facility::LOG_CRON,
        "authpriv" => Facility::LOG_AUTHPRIV,
        "ftp" => Facility::LOG_FTP,
        "local0" => Facility::LOG_LOCAL0,
        "local1" => Facility::LOG_LOCAL1,
        "local2" => Facility::LOG_LOCAL2,
        "local3" => Facility::LOG_LOCAL3,
        "local4" => Facility::LOG_LOCAL4,
        "local5" => Facility::LOG_LOCAL5,
        "local6" => Facility::LOG_LOCAL6,
        "local7" => Facility::LOG_LOCAL7,
        _ => return None,
    };
    Some(facility)
}

/// Forwards formatted events to syslog
///
/// # Examples
///
/// ```no_run
/// use rust_log_dispatch::prelude::*;
/// use rust_log_dispatch::transports::syslog::{parse_facility, SyslogTransport};
/// use std::sync::Arc;
///
/// let facility = parse_facility("local0").unwrap();
/// let transport = SyslogTransport::connect("myapp", facility, Level::INFO).unwrap();
///
/// let logger = Logger::new();
/// logger.add_transport(Arc::new(transport));
/// logger.info("sent to syslog");
/// ```
pub struct SyslogTransport {
    connection: Mutex<Option<Connection>>,
    tag: String,
    min_level: Level,
    formatter: Arc<dyn Formatter>,
}

impl SyslogTransport {
    /// Connect to the platform's default syslog socket
    pub fn connect(tag: impl Into<String>, facility: Facility, min_level: Level) -> Result<Self> {
        let tag = tag.into();
        let connection = ::syslog::unix(header(&tag, facility)).map_err(|e| {
            LoggerError::syslog(tag.clone(), format!("Failed to connect: {}", e))
        })?;
        Ok(Self::from_connection(connection, tag, min_level))
    }

    /// Connect to the syslog socket at `path`
    pub fn connect_socket(
        path: impl AsRef<Path>,
        tag: impl Into<String>,
        facility: Facility,
        min_level: Level,
    ) -> Result<Self> {
        let tag = tag.into();
        let path = path.as_ref();
        let connection = ::syslog::unix_custom(header(&tag, facility), path).map_err(|e| {
            LoggerError::syslog(
                tag.clone(),
                format!("Failed to connect to '{}': {}", path.display(), e),
            )
        })?;
        Ok(Self::from_connection(connection, tag, min_level))
    }

    fn from_connection(connection: Connection, tag: String, min_level: Level) -> Self {
        Self {
            connection: Mutex::new(Some(connection)),
            tag,
            min_level,
            formatter: Arc::new(TextFormatter::new()),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_closed(&self) -> bool {
        self.connection.lock().is_none()
    }

    fn send(&self, level: Level, bytes: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(bytes);
        let message = text.trim_end_matches('\n');

        let mut guard = self.connection.lock();
        let connection = guard
            .as_mut()
            .ok_or_else(|| LoggerError::closed(format!("syslog({})", self.tag)))?;

        let sent = if level >= Level::ERROR {
            connection.err(message)
        } else if level >= Level::WARN {
            connection.warning(message)
        } else if level >= Level::INFO {
            connection.info(message)
        } else {
            connection.debug(message)
        };
        sent.map_err(|e| LoggerError::syslog(self.tag.clone(), format!("Failed to send: {}", e)))
    }
}

fn header(tag: &str, facility: Facility) -> Formatter3164 {
    Formatter3164 {
        facility,
        hostname: None,
        process: tag.to_string(),
        pid: std::process::id(),
    }
}

impl Transport for SyslogTransport {
    fn write_log(&self, event: &Event) -> Result<()> {
        let bytes = render(self.formatter.as_ref(), event);
        self.send(event.level, &bytes)
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn name(&self) -> &str {
        "syslog"
    }

    fn raw_sink(&self) -> Option<&dyn RawSink> {
        Some(self)
    }

    fn closeable(&self) -> Option<&dyn Closeable> {
        Some(self)
    }
}

impl RawSink for SyslogTransport {
    /// Pre-encoded bytes carry no level, so they go out at informational severity
    fn write_raw(&self, bytes: &[u8]) -> Result<()> {
        self.send(Level::INFO, bytes)
    }
}

impl Closeable for SyslogTransport {
    fn close(&self) -> Result<()> {
        self.connection.lock().take();
        Ok(())
    }
}
