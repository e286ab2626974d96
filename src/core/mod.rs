//! Core logger types and traits

pub mod attribute;
pub mod error;
pub mod formatter;
pub mod frontend;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod registry;
pub mod scoped;
pub mod severity;
pub mod severity_logger;
pub mod timestamp;

pub use attribute::{Attribute, AttributeSet, CombinedView, OwnedValue, Value};
pub use error::{LoggerError, Result};
pub use formatter::StringFormatter;
pub use frontend::{
    default_exception_handler, silent_exception_handler, ExceptionHandler, FailureCause,
    Frontend, FrontendFailure,
};
pub use logger::{accept_all, CompositeLogger, Filter, Logger, NoExtraAttributes, PopulateInternal};
pub use metrics::LoggerMetrics;
pub use record::Record;
pub use registry::{FrontendConfig, FrontendFactory, LoggerConfig, Registry};
pub use scoped::ScopedAttributes;
pub use severity::{LogLevel, Severity};
pub use severity_logger::{SeverityLogger, SeverityLoggerBuilder};
pub use timestamp::TimestampFormat;
