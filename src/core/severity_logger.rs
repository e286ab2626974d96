//! Severity-aware logger
//!
//! Wraps the composite engine with the level as extra filter argument, an
//! atomic threshold, and a `severity` internal attribute.

use super::{
    attribute::{names, AttributeSet, CombinedView, Value},
    frontend::{ExceptionHandler, Frontend, FrontendFailure},
    logger::{CompositeLogger, PopulateInternal},
    metrics::LoggerMetrics,
    record::Record,
    scoped::ScopedAttributes,
    severity::{LogLevel, Severity},
};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

struct SeverityAttribute;

impl<L: Severity> PopulateInternal<L> for SeverityAttribute {
    fn extend_internal(&self, internal: &mut AttributeSet<'_>, level: &L) {
        internal.push(names::SEVERITY, level.as_raw());
    }
}

/// Default predicate: admit when `level >= threshold`
fn threshold_filter<L: Severity>(
    threshold: L,
) -> impl Fn(&CombinedView<'_, '_>, &L) -> bool + Send + Sync + 'static {
    let threshold = threshold.as_raw();
    move |_: &CombinedView<'_, '_>, level: &L| level.as_raw() >= threshold
}

/// Logger filtering on a severity threshold
///
/// # Example
///
/// ```
/// use rust_attr_logger::prelude::*;
///
/// let logger = SeverityLogger::new(LogLevel::Warn);
/// let memory = MemoryFrontend::new();
/// logger.add_frontend(memory.clone());
///
/// assert!(!logger.open_record(LogLevel::Info, AttributeSet::new()).is_valid());
///
/// let record = logger.open_record(LogLevel::Error, AttributeSet::new().with("message", "disk full"));
/// assert!(record.is_valid());
/// logger.push(record);
/// assert_eq!(memory.messages(), vec!["disk full".to_string()]);
/// ```
pub struct SeverityLogger<L: Severity = LogLevel> {
    inner: CompositeLogger<L>,
    threshold: AtomicI64,
}

impl<L: Severity> SeverityLogger<L> {
    #[must_use]
    pub fn new(threshold: L) -> Self {
        Self {
            inner: CompositeLogger::from_parts(threshold_filter(threshold), SeverityAttribute),
            threshold: AtomicI64::new(threshold.as_raw()),
        }
    }

    /// Current threshold
    ///
    /// # Panics
    ///
    /// If `L` breaks the [`Severity`] round-trip contract for the stored threshold.
    pub fn verbosity(&self) -> L {
        L::from_raw(self.threshold.load(Ordering::Acquire))
            .expect("threshold only holds values produced by Severity::as_raw")
    }

    /// Install the default `level >= threshold` predicate
    ///
    /// The predicate and the stored threshold are two separate writes; a
    /// concurrent reader may briefly see the new predicate with the old
    /// `verbosity()`.
    pub fn set_filter(&self, threshold: L) {
        self.inner.set_filter(threshold_filter(threshold));
        self.threshold.store(threshold.as_raw(), Ordering::Release);
    }

    /// Install an arbitrary predicate, recording `threshold` for `verbosity()`
    pub fn set_filter_with<F>(&self, threshold: L, filter: F)
    where
        F: Fn(&CombinedView<'_, '_>, &L) -> bool + Send + Sync + 'static,
    {
        self.inner.set_filter(filter);
        self.threshold.store(threshold.as_raw(), Ordering::Release);
    }

    pub fn open_record<'a>(&self, level: L, external: AttributeSet<'a>) -> Record<'a> {
        self.inner.open_record(external, level)
    }

    pub fn push(&self, record: Record<'_>) {
        self.inner.push(record);
    }

    /// Open and push a record carrying a `message` attribute
    pub fn log<'a>(&self, level: L, message: impl Into<Value<'a>>) {
        self.log_with(level, message, AttributeSet::new());
    }

    /// Open and push a record carrying `message` followed by `attributes`
    pub fn log_with<'a>(&self, level: L, message: impl Into<Value<'a>>, attributes: AttributeSet<'a>) {
        if !self.inner.enabled() {
            self.inner.metrics().record_rejected();
            return;
        }
        let mut external = AttributeSet::with_capacity(attributes.len() + 1);
        external.push(names::MESSAGE, message);
        external.extend(attributes);
        let record = self.open_record(level, external);
        self.push(record);
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.inner.enabled()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }

    pub fn add_frontend<F: Frontend + 'static>(&self, frontend: F) {
        self.inner.add_frontend(frontend);
    }

    pub fn add_boxed_frontend(&self, frontend: Box<dyn Frontend>) {
        self.inner.add_boxed_frontend(frontend);
    }

    pub fn set_exception_handler<H>(&self, handler: H)
    where
        H: Fn(&FrontendFailure<'_>) + Send + Sync + 'static,
    {
        self.inner.set_exception_handler(handler);
    }

    pub fn set_shared_exception_handler(&self, handler: ExceptionHandler) {
        self.inner.set_shared_exception_handler(handler);
    }

    pub fn frontend_count(&self) -> usize {
        self.inner.frontend_count()
    }

    pub fn scoped(&self, attributes: AttributeSet<'_>) -> ScopedAttributes {
        self.inner.scoped(attributes)
    }

    pub fn scoped_depth(&self) -> usize {
        self.inner.scoped_depth()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.inner.metrics()
    }

    pub fn flush(&self) {
        self.inner.flush();
    }

    /// Exchange configuration, scoped identity and threshold with `other`
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        self.inner.swap(&other.inner);
        let mine = self.threshold.load(Ordering::Acquire);
        let theirs = other.threshold.swap(mine, Ordering::AcqRel);
        self.threshold.store(theirs, Ordering::Release);
    }
}

impl<L: Severity + Default> SeverityLogger<L> {
    /// Create a builder for SeverityLogger
    ///
    /// # Example
    /// ```
    /// use rust_attr_logger::prelude::*;
    ///
    /// let logger = SeverityLogger::builder()
    ///     .threshold(LogLevel::Debug)
    ///     .frontend(MemoryFrontend::new())
    ///     .build();
    /// assert_eq!(logger.verbosity(), LogLevel::Debug);
    /// ```
    #[must_use]
    pub fn builder() -> SeverityLoggerBuilder<L> {
        SeverityLoggerBuilder::new()
    }
}

impl SeverityLogger<LogLevel> {
    #[inline]
    pub fn trace<'a>(&self, message: impl Into<Value<'a>>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug<'a>(&self, message: impl Into<Value<'a>>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info<'a>(&self, message: impl Into<Value<'a>>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn<'a>(&self, message: impl Into<Value<'a>>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error<'a>(&self, message: impl Into<Value<'a>>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal<'a>(&self, message: impl Into<Value<'a>>) {
        self.log(LogLevel::Fatal, message);
    }
}

impl<L: Severity + Default> Default for SeverityLogger<L> {
    fn default() -> Self {
        Self::new(L::default())
    }
}

impl<L: Severity> fmt::Debug for SeverityLogger<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeverityLogger")
            .field("threshold", &self.threshold.load(Ordering::Relaxed))
            .field("inner", &self.inner)
            .finish()
    }
}

type BoxedFilter<L> = Box<dyn Fn(&CombinedView<'_, '_>, &L) -> bool + Send + Sync>;

/// Builder for constructing SeverityLogger with a fluent API
pub struct SeverityLoggerBuilder<L: Severity> {
    threshold: L,
    enabled: bool,
    filter: Option<BoxedFilter<L>>,
    frontends: Vec<Box<dyn Frontend>>,
    exception_handler: Option<ExceptionHandler>,
}

impl<L: Severity + Default> SeverityLoggerBuilder<L> {
    pub fn new() -> Self {
        Self {
            threshold: L::default(),
            enabled: true,
            filter: None,
            frontends: Vec::new(),
            exception_handler: None,
        }
    }
}

impl<L: Severity> SeverityLoggerBuilder<L> {
    #[must_use = "builder methods return a new value"]
    pub fn threshold(mut self, level: L) -> Self {
        self.threshold = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Replace the default threshold comparison with a custom predicate
    #[must_use = "builder methods return a new value"]
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&CombinedView<'_, '_>, &L) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn frontend<F: Frontend + 'static>(mut self, frontend: F) -> Self {
        self.frontends.push(Box::new(frontend));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_frontend(mut self, frontend: Box<dyn Frontend>) -> Self {
        self.frontends.push(frontend);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn exception_handler<H>(mut self, handler: H) -> Self
    where
        H: Fn(&FrontendFailure<'_>) + Send + Sync + 'static,
    {
        self.exception_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> SeverityLogger<L> {
        let logger = SeverityLogger::new(self.threshold);
        if let Some(filter) = self.filter {
            logger.set_filter_with(self.threshold, filter);
        }
        logger.set_enabled(self.enabled);
        if let Some(handler) = self.exception_handler {
            logger.set_shared_exception_handler(handler);
        }
        for frontend in self.frontends {
            logger.add_boxed_frontend(frontend);
        }
        logger
    }
}

impl<L: Severity + Default> Default for SeverityLoggerBuilder<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontends::MemoryFrontend;

    #[test]
    fn test_threshold_admission() {
        let logger = SeverityLogger::new(LogLevel::Warn);
        assert!(!logger.open_record(LogLevel::Info, AttributeSet::new()).is_valid());
        assert!(logger.open_record(LogLevel::Warn, AttributeSet::new()).is_valid());
        assert!(logger.open_record(LogLevel::Error, AttributeSet::new()).is_valid());
    }

    #[test]
    fn test_severity_attribute_added() {
        let logger = SeverityLogger::new(LogLevel::Warn);
        let record = logger.open_record(LogLevel::Warn, AttributeSet::new());
        assert_eq!(
            record.internal().get(names::SEVERITY),
            Some(&Value::Int(LogLevel::Warn.as_raw()))
        );
        assert_eq!(record.severity::<LogLevel>(), Some(LogLevel::Warn));
    }

    #[test]
    fn test_set_filter_updates_verbosity() {
        let logger = SeverityLogger::new(LogLevel::Info);
        assert_eq!(logger.verbosity(), LogLevel::Info);

        logger.set_filter(LogLevel::Error);
        assert_eq!(logger.verbosity(), LogLevel::Error);
        assert!(!logger.open_record(LogLevel::Warn, AttributeSet::new()).is_valid());
    }

    #[test]
    fn test_custom_filter_keeps_threshold_for_introspection() {
        let logger = SeverityLogger::new(LogLevel::Info);
        logger.set_filter_with(LogLevel::Debug, |view, level| {
            *level == LogLevel::Trace || view.contains("audit")
        });

        assert_eq!(logger.verbosity(), LogLevel::Debug);
        assert!(logger.open_record(LogLevel::Trace, AttributeSet::new()).is_valid());
        assert!(!logger.open_record(LogLevel::Fatal, AttributeSet::new()).is_valid());
        assert!(logger
            .open_record(LogLevel::Fatal, AttributeSet::new().with("audit", 1))
            .is_valid());
    }

    #[test]
    fn test_log_helpers_attach_message() {
        let memory = MemoryFrontend::new();
        let logger = SeverityLogger::builder()
            .threshold(LogLevel::Info)
            .frontend(memory.clone())
            .build();

        logger.debug("hidden");
        logger.info("shown");
        logger.log_with(LogLevel::Error, "failed", AttributeSet::new().with("code", 500));

        assert_eq!(memory.messages(), vec!["shown".to_string(), "failed".to_string()]);
        let records = memory.records();
        assert_eq!(records[1].get("code"), Some(&Value::Int(500)));
    }

    #[test]
    fn test_builder_disabled() {
        let logger: SeverityLogger = SeverityLogger::builder().enabled(false).build();
        assert!(!logger.open_record(LogLevel::Fatal, AttributeSet::new()).is_valid());
    }

    #[test]
    fn test_custom_severity_type() {
        let logger = SeverityLogger::<i64>::new(10);
        assert!(!logger.open_record(9, AttributeSet::new()).is_valid());
        let record = logger.open_record(42, AttributeSet::new());
        assert_eq!(record.severity::<i64>(), Some(42));
    }

    #[test]
    fn test_swap_exchanges_threshold() {
        let first = SeverityLogger::new(LogLevel::Trace);
        let second = SeverityLogger::new(LogLevel::Fatal);
        first.swap(&second);
        assert_eq!(first.verbosity(), LogLevel::Fatal);
        assert_eq!(second.verbosity(), LogLevel::Trace);
        assert!(!first.open_record(LogLevel::Error, AttributeSet::new()).is_valid());
    }
}
