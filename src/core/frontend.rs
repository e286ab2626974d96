//! Frontend trait for record consumers

use super::{error::LoggerError, error::Result, record::Record};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Formats and sinks completed records
///
/// Dispatch runs under a shared lock, so `handle` may be called from several
/// threads at once. Implementations guard their own writers.
pub trait Frontend: Send + Sync {
    fn handle(&self, record: &Record<'_>) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<F: Frontend + ?Sized> Frontend for Box<F> {
    fn handle(&self, record: &Record<'_>) -> Result<()> {
        (**self).handle(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<F: Frontend + ?Sized> Frontend for Arc<F> {
    fn handle(&self, record: &Record<'_>) -> Result<()> {
        (**self).handle(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// What went wrong inside a frontend
#[derive(Debug)]
pub enum FailureCause {
    Error(LoggerError),
    Panic(String),
}

impl FailureCause {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        FailureCause::Panic(message)
    }
}

/// A single failed frontend invocation, as reported to the exception handler
#[derive(Debug)]
pub struct FrontendFailure<'f> {
    /// Registration index of the frontend
    pub index: usize,
    pub frontend: &'f str,
    pub operation: &'static str,
    pub cause: FailureCause,
}

impl fmt::Display for FrontendFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            FailureCause::Error(e) => write!(
                f,
                "Frontend #{} ({}) {} failed: {}",
                self.index, self.frontend, self.operation, e
            ),
            FailureCause::Panic(msg) => write!(
                f,
                "Frontend #{} ({}) panicked during {}: {}",
                self.index, self.frontend, self.operation, msg
            ),
        }
    }
}

/// Invoked once per failing frontend. Must not panic.
pub type ExceptionHandler = Arc<dyn Fn(&FrontendFailure<'_>) + Send + Sync>;

/// Best-effort report to stderr
pub fn default_exception_handler() -> ExceptionHandler {
    Arc::new(|failure: &FrontendFailure<'_>| {
        match failure.cause {
            FailureCause::Error(_) => eprintln!("[LOGGER ERROR] {}", failure),
            FailureCause::Panic(_) => eprintln!(
                "[LOGGER CRITICAL] {}. Other frontends continue to function.",
                failure
            ),
        }
    })
}

/// Handler that drops every failure on the floor
pub fn silent_exception_handler() -> ExceptionHandler {
    Arc::new(|_: &FrontendFailure<'_>| {})
}
