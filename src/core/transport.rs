//! Transport contract for log destinations
//!
//! A transport receives whole events, formats them with its own formatter
//! and writes them to a destination. Transports are shared between threads
//! behind `Arc`, so every method takes `&self`; a transport that owns an
//! exclusive resource serializes access to it internally.
//!
//! Two capabilities are optional and discovered at runtime:
//! - [`RawSink`]: accepts already-encoded bytes, used by per-call formatter
//!   overrides
//! - [`Closeable`]: flushes and releases the underlying resource

use super::error::Result;
use super::event::Event;
use super::level::Level;
use std::fmt;
use std::sync::Arc;

pub trait Transport: Send + Sync {
    /// Write one event to the destination
    fn write_log(&self, event: &Event) -> Result<()>;

    /// Events below this level are never handed to the transport
    fn min_level(&self) -> Level;

    fn name(&self) -> &str {
        "transport"
    }

    /// Whether this transport wants `event` at all.
    ///
    /// Returning `false` drops the event silently; it is not a failure.
    fn accepts(&self, _event: &Event) -> bool {
        true
    }

    /// The raw byte sink behind this transport, if it exposes one
    fn raw_sink(&self) -> Option<&dyn RawSink> {
        None
    }

    /// Close capability, if this transport holds a releasable resource
    fn closeable(&self) -> Option<&dyn Closeable> {
        None
    }
}

/// A destination that takes pre-encoded bytes
pub trait RawSink: Send + Sync {
    fn write_raw(&self, bytes: &[u8]) -> Result<()>;
}

/// A transport resource that can be flushed and released
pub trait Closeable: Send + Sync {
    fn close(&self) -> Result<()>;
}

impl fmt::Debug for dyn Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("name", &self.name())
            .field("min_level", &self.min_level())
            .finish()
    }
}

/// Predicate deciding whether a filtered transport sees an event
pub type EventFilter = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Decorator that drops events failing a predicate
///
/// Dropped events count as delivered: no error, no error-hook. Minimum level
/// and capabilities are those of the wrapped transport.
///
/// The dispatch engine asks [`Transport::accepts`] before writing, and
/// `write_log` checks the predicate again for callers that write to the
/// decorator directly. A delivered event therefore runs the predicate twice
/// and a rejected one once, so predicates should be free of side effects.
/// Sampling or counting belongs in a hook.
///
/// # Example
///
/// ```
/// use rust_log_dispatch::prelude::*;
/// use std::sync::Arc;
///
/// let buffer = SharedBuffer::new();
/// let inner: Arc<dyn Transport> = Arc::new(WriterTransport::new(buffer.clone(), Level::INFO));
/// let filtered = FilteredTransport::new(inner, |event: &Event| event.message.contains("keep"));
///
/// let logger = Logger::new();
/// logger.add_transport(Arc::new(filtered));
/// logger.info("drop me");
/// logger.info("keep me");
///
/// assert!(!buffer.contents().contains("drop me"));
/// assert!(buffer.contents().contains("keep me"));
/// ```
pub struct FilteredTransport {
    inner: Arc<dyn Transport>,
    filter: EventFilter,
}

impl FilteredTransport {
    pub fn new<F>(inner: Arc<dyn Transport>, filter: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Self {
            inner,
            filter: Arc::new(filter),
        }
    }

    /// The wrapped transport
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn Transport> {
        &self.inner
    }
}

impl Transport for FilteredTransport {
    fn write_log(&self, event: &Event) -> Result<()> {
        if !(self.filter)(event) {
            return Ok(());
        }
        self.inner.write_log(event)
    }

    fn min_level(&self) -> Level {
        self.inner.min_level()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn accepts(&self, event: &Event) -> bool {
        (self.filter)(event) && self.inner.accepts(event)
    }

    fn raw_sink(&self) -> Option<&dyn RawSink> {
        self.inner.raw_sink()
    }

    fn closeable(&self) -> Option<&dyn Closeable> {
        self.inner.closeable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        messages: Mutex<Vec<String>>,
    }

    impl Transport for Recording {
        fn write_log(&self, event: &Event) -> Result<()> {
            self.messages.lock().push(event.message.clone());
            Ok(())
        }

        fn min_level(&self) -> Level {
            Level::WARN
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[test]
    fn test_filter_drops_silently() {
        let inner = Arc::new(Recording::default());
        let filtered = FilteredTransport::new(inner.clone(), |e: &Event| e.message.contains("keep"));

        assert!(filtered.write_log(&Event::new(Level::ERROR, "drop me")).is_ok());
        assert!(filtered.write_log(&Event::new(Level::ERROR, "keep me")).is_ok());

        assert_eq!(*inner.messages.lock(), vec!["keep me".to_string()]);
    }

    #[test]
    fn test_filter_passes_level_and_name_through() {
        let inner = Arc::new(Recording::default());
        let filtered = FilteredTransport::new(inner, |_: &Event| true);

        assert_eq!(filtered.min_level(), Level::WARN);
        assert_eq!(filtered.name(), "recording");
        assert!(filtered.raw_sink().is_none());
        assert!(filtered.closeable().is_none());
    }

    #[test]
    fn test_predicate_runs_in_accepts_and_write_log() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let filtered = FilteredTransport::new(Arc::new(Recording::default()), move |e: &Event| {
            counter.fetch_add(1, Ordering::SeqCst);
            e.message == "keep"
        });

        let rejected = Event::new(Level::ERROR, "drop");
        assert!(!filtered.accepts(&rejected));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let delivered = Event::new(Level::ERROR, "keep");
        assert!(filtered.accepts(&delivered));
        filtered.write_log(&delivered).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_accepts_reflects_predicate() {
        let filtered = FilteredTransport::new(Arc::new(Recording::default()), |e: &Event| {
            e.level >= Level::ERROR
        });
        assert!(!filtered.accepts(&Event::new(Level::WARN, "w")));
        assert!(filtered.accepts(&Event::new(Level::ERROR, "e")));
    }
}
