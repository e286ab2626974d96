//! Logging macros for ergonomic log message formatting.
//!
//! The level macros format their arguments like `format!` and hand the
//! result to [`SeverityLogger::log`](crate::SeverityLogger::log). Nothing is
//! formatted while the logger is disabled.
//!
//! # Examples
//!
//! ```
//! use rust_attr_logger::prelude::*;
//! use rust_attr_logger::{attributes, info};
//!
//! let memory = MemoryFrontend::new();
//! let logger = SeverityLogger::new(LogLevel::Info);
//! logger.add_frontend(memory.clone());
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Attach attributes to a single record
//! info!(logger, attrs: attributes! { "user_id" => 42, "action" => "login" }, "User logged in");
//!
//! assert_eq!(memory.len(), 2);
//! ```

/// Build an [`AttributeSet`](crate::AttributeSet) from `name => value` pairs.
///
/// # Examples
///
/// ```
/// use rust_attr_logger::attributes;
///
/// let set = attributes! { "request_id" => "abc", "attempt" => 3 };
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.get("attempt").and_then(|v| v.as_i64()), Some(3));
/// ```
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::AttributeSet::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut set = $crate::AttributeSet::new();
        $( set.push($name, $value); )+
        set
    }};
}

/// Log a message with automatic formatting.
///
/// An attribute set may precede the format string, marked with `attrs:`.
///
/// # Examples
///
/// ```
/// # use rust_attr_logger::prelude::*;
/// # let logger = SeverityLogger::new(LogLevel::Info);
/// use rust_attr_logger::{attributes, log};
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, attrs: attributes! { "code" => 503 }, "Upstream unavailable");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, attrs: $attrs:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        if logger.enabled() {
            logger.log_with($level, format!($($arg)+), $attrs)
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        if logger.enabled() {
            logger.log($level, format!($($arg)+))
        }
    }};
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_attr_logger::prelude::*;
/// # let logger = SeverityLogger::new(LogLevel::Trace);
/// use rust_attr_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_attr_logger::prelude::*;
/// # let logger = SeverityLogger::new(LogLevel::Info);
/// use rust_attr_logger::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
