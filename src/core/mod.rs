//! Core dispatch types and traits

pub mod context;
pub mod error;
pub mod event;
pub mod field_logger;
pub mod fields;
pub mod formatter;
pub mod hooks;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod timestamp;
pub mod transport;

pub use context::{ContextKey, ContextLookup, CtxKey, RequestContext};
pub use error::{LoggerError, Result};
pub use event::{BacktraceCapture, Event, StackCapture, STACKTRACE_KEY, TRACE_ID_KEY};
pub use field_logger::FieldLogger;
pub use fields::{FieldValue, Fields};
pub use formatter::{fallback_line, render, Formatter, JsonFormatter, LogfmtFormatter, TextFormatter};
pub use hooks::{ErrorHook, Hook, HookId, HookPhase};
pub use level::{parse_level, register_level, Level, LevelRegistry, UNKNOWN_LEVEL_NAME};
pub use logger::{EntryBuilder, Logger, LoggerBuilder, StacktracePolicy};
pub use metrics::DispatchMetrics;
pub use timestamp::TimestampFormat;
pub use transport::{Closeable, EventFilter, FilteredTransport, RawSink, Transport};
