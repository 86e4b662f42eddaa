//! Dispatch metrics for observability
//!
//! Counters describing what the dispatch engine did. They never influence
//! dispatch; they exist so operators and tests can see write attempts and
//! failures without registering hooks.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for dispatch observability
///
/// # Example
///
/// ```
/// use rust_log_dispatch::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
/// metrics.record_write();
/// metrics.record_failure();
///
/// assert_eq!(metrics.writes_attempted(), 1);
/// assert_eq!(metrics.writes_failed(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Log calls fully dispatched
    events_dispatched: AtomicU64,

    /// Transport writes attempted (one per eligible transport per event)
    writes_attempted: AtomicU64,

    /// Transport writes that returned an error or panicked
    writes_failed: AtomicU64,

    /// Events a filtering decorator declined
    writes_filtered: AtomicU64,

    /// Transport panics caught during writes
    transport_panics: AtomicU64,
}

impl DispatchMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            events_dispatched: AtomicU64::new(0),
            writes_attempted: AtomicU64::new(0),
            writes_failed: AtomicU64::new(0),
            writes_filtered: AtomicU64::new(0),
            transport_panics: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes_attempted(&self) -> u64 {
        self.writes_attempted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes_failed(&self) -> u64 {
        self.writes_failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes_filtered(&self) -> u64 {
        self.writes_filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transport_panics(&self) -> u64 {
        self.transport_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write(&self) -> u64 {
        self.writes_attempted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failure(&self) -> u64 {
        self.writes_failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.writes_filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_panic(&self) -> u64 {
        self.transport_panics.fetch_add(1, Ordering::Relaxed)
    }

    /// Failed writes as a percentage of attempted writes (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written.
    pub fn failure_rate(&self) -> f64 {
        let attempted = self.writes_attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.writes_failed() as f64 / attempted as f64) * 100.0
    }
}
