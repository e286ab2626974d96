//! Logger metrics for observability
//!
//! Counters describing how records move through a logger: how many were
//! admitted or rejected at open time, how many were dispatched, and how many
//! frontend invocations failed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_attr_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_opened();
/// metrics.record_rejected();
///
/// assert_eq!(metrics.records_opened(), 1);
/// assert_eq!(metrics.records_rejected(), 1);
/// assert_eq!(metrics.rejection_rate(), 50.0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Valid records returned by `open_record`
    records_opened: AtomicU64,

    /// Records refused because the logger was disabled or the filter said no
    records_rejected: AtomicU64,

    /// Valid records fanned out by `push`
    records_dispatched: AtomicU64,

    /// Frontend invocations that returned an error or panicked
    frontend_failures: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            records_opened: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
            records_dispatched: AtomicU64::new(0),
            frontend_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_opened(&self) -> u64 {
        self.records_opened.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_rejected(&self) -> u64 {
        self.records_rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_dispatched(&self) -> u64 {
        self.records_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn frontend_failures(&self) -> u64 {
        self.frontend_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_opened(&self) -> u64 {
        self.records_opened.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.records_rejected.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.records_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_frontend_failure(&self) -> u64 {
        self.frontend_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of open attempts that were rejected, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been opened yet.
    pub fn rejection_rate(&self) -> f64 {
        let rejected = self.records_rejected() as f64;
        let total = self.records_opened() as f64 + rejected;
        if total == 0.0 {
            0.0
        } else {
            (rejected / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.records_opened.store(0, Ordering::Relaxed);
        self.records_rejected.store(0, Ordering::Relaxed);
        self.records_dispatched.store(0, Ordering::Relaxed);
        self.frontend_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            records_opened: AtomicU64::new(self.records_opened()),
            records_rejected: AtomicU64::new(self.records_rejected()),
            records_dispatched: AtomicU64::new(self.records_dispatched()),
            frontend_failures: AtomicU64::new(self.frontend_failures()),
        }
    }
}
