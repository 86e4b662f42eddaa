//! Log event structure

use super::fields::{FieldValue, Fields};
use super::level::{Level, LevelRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::fmt;

/// Reserved field key holding a captured stack trace
pub const STACKTRACE_KEY: &str = "stacktrace";

/// Reserved field key holding a trace identifier taken from a request context
pub const TRACE_ID_KEY: &str = "trace_id";

/// One log call, assembled once and handed to hooks and transports
///
/// Before-hooks may mutate `fields` in place. Once fan-out starts the event
/// is only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub level: Level,
    /// Level name as registered when the event was assembled
    pub level_name: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub fields: Fields,
}

impl Event {
    /// Assemble an event, naming its level with the process-wide registry
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::with_registry(LevelRegistry::global(), level, message)
    }

    /// Assemble an event, naming its level with `registry`
    pub fn with_registry(registry: &LevelRegistry, level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            level_name: registry.name(level),
            timestamp: Utc::now(),
            message: message.into(),
            fields: Fields::new(),
        }
    }

    /// Merge `fields` into this event's field set
    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields.merge(fields);
        self
    }

    /// Captured stack trace, if any
    #[must_use]
    pub fn stacktrace(&self) -> Option<&str> {
        self.fields.get(STACKTRACE_KEY).and_then(FieldValue::as_str)
    }

    pub fn set_stacktrace(&mut self, trace: impl Into<String>) {
        self.fields.insert(STACKTRACE_KEY, trace.into());
    }

    pub fn clear_stacktrace(&mut self) {
        self.fields.remove(STACKTRACE_KEY);
    }
}

/// Produces a textual representation of the current call stack
///
/// Frame count and symbol resolution are up to the implementation.
pub trait StackCapture: Send + Sync {
    fn capture(&self) -> String;
}

/// Stack capture backed by [`std::backtrace::Backtrace`]
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceCapture;

impl StackCapture for BacktraceCapture {
    fn capture(&self) -> String {
        Backtrace::force_capture().to_string()
    }
}

impl<F> StackCapture for F
where
    F: Fn() -> String + Send + Sync,
{
    fn capture(&self) -> String {
        self()
    }
}

impl fmt::Debug for dyn StackCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StackCapture")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = Event::new(Level::WARN, "disk almost full");
        assert_eq!(event.level, Level::WARN);
        assert_eq!(event.level_name, "WARN");
        assert_eq!(event.message, "disk almost full");
        assert!(event.fields.is_empty());
        assert!(event.stacktrace().is_none());
    }

    #[test]
    fn test_event_uses_given_registry() {
        let registry = LevelRegistry::new();
        registry.register("AUDIT", Level::new(5));
        let event = Event::with_registry(&registry, Level::new(5), "login");
        assert_eq!(event.level_name, "AUDIT");
    }

    #[test]
    fn test_stacktrace_lives_in_fields() {
        let mut event = Event::new(Level::ERROR, "boom");
        event.set_stacktrace("frame 0");

        assert_eq!(event.stacktrace(), Some("frame 0"));
        assert!(event.fields.contains_key(STACKTRACE_KEY));

        event.clear_stacktrace();
        assert!(event.stacktrace().is_none());
    }

    #[test]
    fn test_closure_stack_capture() {
        let capture = || "fake frames".to_string();
        assert_eq!(capture.capture(), "fake frames");
        assert!(!BacktraceCapture.capture().is_empty());
    }
}
