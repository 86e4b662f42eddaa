//! # Rust Log Dispatch
//!
//! A synchronous, thread-safe structured logging core. A log call becomes one
//! event that runs through before-hooks, is written to every eligible
//! transport in registration order, and finishes with after-hooks.
//!
//! ## Features
//!
//! - **Runtime configuration**: transports and hooks can be added and
//!   removed while other threads are logging
//! - **Failure isolation**: a failing or panicking transport never stops the
//!   others and never reaches the caller; error-hooks see every failure
//! - **Structured fields**: recursive field merging, field-bound loggers and
//!   request-context trace identifiers
//! - **Pluggable output**: text, JSON and logfmt formatters; console, file,
//!   rotating-file, syslog and in-memory transports
//!
//! ## Example
//!
//! ```
//! use rust_log_dispatch::prelude::*;
//! use std::sync::Arc;
//!
//! let buffer = SharedBuffer::new();
//! let logger = Logger::new();
//! logger.add_transport(Arc::new(WriterTransport::new(buffer.clone(), Level::INFO)));
//!
//! let auth = logger.with_fields(fields! { "service" => "auth" });
//! auth.info("user signed in");
//!
//! assert!(buffer.contents().contains("[INFO] user signed in service=auth"));
//! ```

pub mod config;
pub mod core;
pub mod macros;
pub mod transports;

pub mod prelude {
    pub use crate::config::{LoggerConfig, TransportConfig};
    pub use crate::core::{
        ContextLookup, CtxKey, Event, FieldLogger, FieldValue, Fields, FilteredTransport,
        Formatter, HookId, JsonFormatter, Level, LogfmtFormatter, Logger, LoggerBuilder,
        LoggerError, RequestContext, Result, TextFormatter, TimestampFormat, Transport,
    };
    pub use crate::fields;
    #[cfg(feature = "file")]
    pub use crate::transports::{FileTransport, RotatingFileTransport};
    pub use crate::transports::{ConsoleTransport, SharedBuffer, WriterTransport};
}

pub use config::{LoggerConfig, TransportConfig};
pub use core::{
    parse_level, register_level, BacktraceCapture, Closeable, ContextKey, ContextLookup, CtxKey,
    DispatchMetrics, EntryBuilder, ErrorHook, Event, FieldLogger, FieldValue, Fields,
    FilteredTransport, Formatter, Hook, HookId, HookPhase, JsonFormatter, Level, LevelRegistry,
    LogfmtFormatter, Logger, LoggerBuilder, LoggerError, RawSink, RequestContext, Result,
    StackCapture, StacktracePolicy, TextFormatter, TimestampFormat, Transport,
};
pub use transports::{ConsoleTransport, SharedBuffer, WriterTransport};
#[cfg(feature = "file")]
pub use transports::{FileTransport, RotatingFileTransport, RotationPolicy, RotationStrategy};
#[cfg(all(feature = "syslog", unix))]
pub use transports::SyslogTransport;
