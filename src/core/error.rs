//! Error types for the dispatch core

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML deserialization error
    #[cfg(feature = "yaml")]
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Configuration names a transport type nobody knows how to build
    #[error("Unknown transport type '{kind}'")]
    UnknownTransport { kind: String },

    /// File transport error with path
    #[error("File transport error for '{path}': {message}")]
    FileTransportError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Connecting to or sending to the system log failed
    #[error("Syslog error for '{tag}': {message}")]
    SyslogError { tag: String, message: String },

    /// Write attempted after the transport released its resource
    #[error("Transport '{name}' is closed")]
    TransportClosed { name: String },

    /// A transport panicked while writing; the panic was contained
    #[error("Transport '{name}' panicked: {message}")]
    TransportPanicked { name: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an unknown transport type error
    pub fn unknown_transport(kind: impl Into<String>) -> Self {
        LoggerError::UnknownTransport { kind: kind.into() }
    }

    /// Create a file transport error
    pub fn file_transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileTransportError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a syslog error
    pub fn syslog(tag: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SyslogError {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Create a closed-transport error
    pub fn closed(name: impl Into<String>) -> Self {
        LoggerError::TransportClosed { name: name.into() }
    }

    /// Create a contained-panic error
    pub fn panicked(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::TransportPanicked {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
