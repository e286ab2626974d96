//! # Rust Attribute Logger
//!
//! A composable, attribute-based logging core. Every record is a set of named
//! attributes rather than a formatted string; filters decide on attributes,
//! frontends decide how to render them.
//!
//! ## Features
//!
//! - **Attribute records**: internal attributes (pid, thread, timestamp,
//!   severity) and caller attributes kept apart, read through one combined view
//! - **Scoped attributes**: per-thread, per-logger context that is attached to
//!   every record while a guard is alive
//! - **Concurrent engine**: record creation and dispatch run under independent
//!   reader/writer locks, so reconfiguration never blocks the other path
//! - **Failure isolation**: a failing or panicking frontend is reported to an
//!   exception handler and never stops the others
//! - **Frontends**: console, JSON lines, in-memory, and a queued wrapper that
//!   moves any frontend onto a worker thread
//!
//! ## Example
//!
//! ```
//! use rust_attr_logger::prelude::*;
//!
//! let memory = MemoryFrontend::new();
//! let logger = SeverityLogger::builder()
//!     .threshold(LogLevel::Info)
//!     .frontend(memory.clone())
//!     .build();
//!
//! let _request = logger.scoped(AttributeSet::new().with("request_id", "r-17"));
//! logger.log_with(LogLevel::Warn, "slow response", AttributeSet::new().with("ms", 912));
//! logger.debug("not admitted");
//!
//! let records = memory.records();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].get("request_id").and_then(|v| v.as_str()), Some("r-17"));
//! ```

pub mod core;
pub mod frontends;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::frontends::ConsoleFrontend;
    pub use crate::frontends::{AsyncFrontend, JsonFrontend, MemoryFrontend, QueuePolicy};
    pub use crate::core::{
        Attribute, AttributeSet, CombinedView, CompositeLogger, Frontend, FrontendFailure,
        LogLevel, Logger, LoggerConfig, LoggerError, LoggerMetrics, Record, Registry, Result,
        ScopedAttributes, Severity, SeverityLogger, StringFormatter, TimestampFormat, Value,
    };
}

#[cfg(feature = "console")]
pub use frontends::ConsoleFrontend;
pub use frontends::{AsyncFrontend, JsonFrontend, MemoryFrontend, QueuePolicy, DEFAULT_SHUTDOWN_TIMEOUT};
pub use core::{
    accept_all, default_exception_handler, silent_exception_handler, Attribute, AttributeSet,
    CombinedView, CompositeLogger, ExceptionHandler, FailureCause, Filter, Frontend,
    FrontendConfig, FrontendFailure, LogLevel, Logger, LoggerConfig, LoggerError, LoggerMetrics,
    NoExtraAttributes, OwnedValue, PopulateInternal, Record, Registry, Result, ScopedAttributes,
    Severity, SeverityLogger, SeverityLoggerBuilder, StringFormatter, TimestampFormat, Value,
};
