//! Composite logger engine
//!
//! The engine owns a filter, an exception handler and an ordered list of
//! frontends. Two independent reader/writer locks split the hot paths:
//!
//! - the *open* lock guards the filter (and the scoped-stack identity);
//!   `open_record` takes it shared, `set_filter` exclusive;
//! - the *push* lock guards the frontend list and the exception handler;
//!   `push` takes it shared, `add_frontend` / `set_exception_handler` exclusive.
//!
//! Record creation therefore never waits on frontend reconfiguration and
//! dispatch never waits on filter replacement. The enabled flag is a plain
//! atomic checked before either lock.

use super::{
    attribute::{
        names, AttributeSet, CombinedView, EXTERNAL_SET_RESERVED_SIZE,
        INTERNAL_SET_RESERVED_SIZE,
    },
    frontend::{default_exception_handler, ExceptionHandler, FailureCause, Frontend, FrontendFailure},
    metrics::LoggerMetrics,
    record::Record,
    scoped::{ScopedAttributes, ScopedStack},
};
use chrono::Utc;
use parking_lot::RwLock;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

/// Admission predicate: sees scoped + caller attributes and the extra argument.
pub type Filter<A> = Box<dyn Fn(&CombinedView<'_, '_>, &A) -> bool + Send + Sync>;

/// Variant-specific internal attributes, appended after the common ones.
pub trait PopulateInternal<A>: Send + Sync {
    fn extend_internal(&self, internal: &mut AttributeSet<'_>, args: &A);
}

/// Adds nothing; used by the plain logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtraAttributes;

impl<A> PopulateInternal<A> for NoExtraAttributes {
    fn extend_internal(&self, _internal: &mut AttributeSet<'_>, _args: &A) {}
}

struct DispatchState {
    frontends: Vec<Box<dyn Frontend>>,
    exception: ExceptionHandler,
}

pub struct CompositeLogger<A: 'static = ()> {
    enabled: AtomicBool,
    scoped: ScopedStack,
    open: RwLock<Filter<A>>,
    push: RwLock<DispatchState>,
    populate: Box<dyn PopulateInternal<A>>,
    metrics: LoggerMetrics,
}

/// Plain logger without extra filter arguments. Admits everything by default.
pub type Logger = CompositeLogger<()>;

impl<A: 'static> CompositeLogger<A> {
    /// Assemble an engine from a filter and an internal-population hook
    pub fn from_parts<F, P>(filter: F, populate: P) -> Self
    where
        F: Fn(&CombinedView<'_, '_>, &A) -> bool + Send + Sync + 'static,
        P: PopulateInternal<A> + 'static,
    {
        Self {
            enabled: AtomicBool::new(true),
            scoped: ScopedStack::new(),
            open: RwLock::new(Box::new(filter)),
            push: RwLock::new(DispatchState {
                frontends: Vec::new(),
                exception: default_exception_handler(),
            }),
            populate: Box::new(populate),
            metrics: LoggerMetrics::new(),
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn set_filter<F>(&self, filter: F)
    where
        F: Fn(&CombinedView<'_, '_>, &A) -> bool + Send + Sync + 'static,
    {
        *self.open.write() = Box::new(filter);
    }

    /// Append a frontend; frontends receive records in registration order.
    pub fn add_frontend<F: Frontend + 'static>(&self, frontend: F) {
        self.add_boxed_frontend(Box::new(frontend));
    }

    pub fn add_boxed_frontend(&self, frontend: Box<dyn Frontend>) {
        self.push.write().frontends.push(frontend);
    }

    pub fn set_exception_handler<H>(&self, handler: H)
    where
        H: Fn(&FrontendFailure<'_>) + Send + Sync + 'static,
    {
        self.set_shared_exception_handler(std::sync::Arc::new(handler));
    }

    pub fn set_shared_exception_handler(&self, handler: ExceptionHandler) {
        self.push.write().exception = handler;
    }

    pub fn frontend_count(&self) -> usize {
        self.push.read().frontends.len()
    }

    /// Push attributes onto this thread's scoped stack until the guard is dropped
    pub fn scoped(&self, attributes: AttributeSet<'_>) -> ScopedAttributes {
        self.scoped.enter(attributes)
    }

    /// Number of scoped frames active on the calling thread
    pub fn scoped_depth(&self) -> usize {
        self.scoped.depth()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Run the filter and, if it admits, build a record
    ///
    /// Returns an invalid record when the logger is disabled or the filter
    /// rejects. The filter runs before any internal attribute is built and
    /// sees only the scoped frames and `external`.
    pub fn open_record<'a>(&self, mut external: AttributeSet<'a>, args: A) -> Record<'a> {
        if !self.enabled() {
            self.metrics.record_rejected();
            return Record::invalid();
        }

        let filter = self.open.read();
        if !self.scoped.with_view(&external, |view| (*filter)(view, &args)) {
            self.metrics.record_rejected();
            return Record::invalid();
        }

        let mut internal = AttributeSet::with_capacity(INTERNAL_SET_RESERVED_SIZE);
        populate(&mut internal);
        self.populate.extend_internal(&mut internal, &args);

        external.reserve(EXTERNAL_SET_RESERVED_SIZE);
        self.scoped.merge(&mut external);
        drop(filter);

        self.metrics.record_opened();
        Record::new(internal, external)
    }

    /// Dispatch a record to every frontend
    ///
    /// Invalid records are ignored. Each frontend is isolated: an error or a
    /// panic is reported to the exception handler and dispatch moves on to
    /// the next frontend. Nothing propagates to the caller.
    pub fn push(&self, record: Record<'_>) {
        if !record.is_valid() {
            return;
        }

        let state = self.push.read();
        for (index, frontend) in state.frontends.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| frontend.handle(&record)));
            let cause = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => FailureCause::Error(e),
                Err(payload) => FailureCause::from_panic(payload),
            };
            self.metrics.record_frontend_failure();
            (state.exception)(&FrontendFailure {
                index,
                frontend: frontend.name(),
                operation: "handle",
                cause,
            });
        }
        self.metrics.record_dispatched();
    }

    /// Flush every frontend, routing failures to the exception handler
    pub fn flush(&self) {
        let state = self.push.read();
        for (index, frontend) in state.frontends.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| frontend.flush()));
            let cause = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => FailureCause::Error(e),
                Err(payload) => FailureCause::from_panic(payload),
            };
            (state.exception)(&FrontendFailure {
                index,
                frontend: frontend.name(),
                operation: "flush",
                cause,
            });
        }
    }

    /// Exchange the whole configuration of two loggers
    ///
    /// Takes the open and push locks of both loggers, so no concurrent
    /// `open_record` or `push` observes a half-swapped state. Filter,
    /// frontends, exception handler, enabled flag and scoped-stack identity
    /// move; metrics stay with their logger.
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }

        let (first, second) = if (self as *const Self) < (other as *const Self) {
            (self, other)
        } else {
            (other, self)
        };

        let mut first_open = first.open.write();
        let mut first_push = first.push.write();
        let mut second_open = second.open.write();
        let mut second_push = second.push.write();

        std::mem::swap(&mut *first_open, &mut *second_open);
        std::mem::swap(&mut *first_push, &mut *second_push);
        first.scoped.swap(&second.scoped);

        let enabled = first.enabled.load(Ordering::Relaxed);
        let previous = second.enabled.swap(enabled, Ordering::Relaxed);
        first.enabled.store(previous, Ordering::Relaxed);
    }
}

impl CompositeLogger<()> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(accept_all, NoExtraAttributes)
    }

    pub fn open<'a>(&self, external: AttributeSet<'a>) -> Record<'a> {
        self.open_record(external, ())
    }
}

impl Default for CompositeLogger<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> fmt::Debug for CompositeLogger<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.push.read();
        let frontends: Vec<&str> = state.frontends.iter().map(|fe| fe.name()).collect();
        f.debug_struct("CompositeLogger")
            .field("enabled", &self.enabled())
            .field("frontends", &frontends)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// Filter admitting every record
pub fn accept_all<A>(_view: &CombinedView<'_, '_>, _args: &A) -> bool {
    true
}

fn populate(internal: &mut AttributeSet<'_>) {
    #[cfg(feature = "attr-pid")]
    internal.push(names::PID, std::process::id());

    #[cfg(feature = "attr-tid")]
    internal.push(names::TID, thread_info::thread_id());

    #[cfg(all(feature = "attr-lwp", target_os = "linux"))]
    internal.push(names::LWP, thread_info::lwp());

    internal.push(names::TIMESTAMP, Utc::now().timestamp_micros());
}

#[cfg(any(feature = "attr-tid", all(feature = "attr-lwp", target_os = "linux")))]
mod thread_info {
    // Thread-local caches for thread information to avoid repeated lookups
    #[cfg(feature = "attr-tid")]
    thread_local! {
        static THREAD_ID_CACHE: std::cell::RefCell<Option<String>> =
            const { std::cell::RefCell::new(None) };
    }

    #[cfg(all(feature = "attr-lwp", target_os = "linux"))]
    thread_local! {
        static LWP_CACHE: std::cell::Cell<Option<i64>> = const { std::cell::Cell::new(None) };
    }

    #[cfg(feature = "attr-tid")]
    pub(super) fn thread_id() -> String {
        THREAD_ID_CACHE
            .try_with(|cache| {
                cache
                    .borrow_mut()
                    .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
                    .clone()
            })
            .unwrap_or_else(|_| format!("{:?}", std::thread::current().id()))
    }

    #[cfg(all(feature = "attr-lwp", target_os = "linux"))]
    pub(super) fn lwp() -> i64 {
        LWP_CACHE
            .try_with(|cache| match cache.get() {
                Some(lwp) => lwp,
                None => {
                    let lwp = current_lwp();
                    cache.set(Some(lwp));
                    lwp
                }
            })
            .unwrap_or_else(|_| current_lwp())
    }

    #[cfg(all(feature = "attr-lwp", target_os = "linux"))]
    fn current_lwp() -> i64 {
        // SAFETY: gettid takes no arguments and cannot fail.
        unsafe { libc::syscall(libc::SYS_gettid) as i64 }
    }
}
