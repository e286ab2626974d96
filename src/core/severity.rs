//! Severity levels
//!
//! [`Severity`] is what a severity-aware logger needs from a level type: a
//! lossless mapping to the integer stored in the atomic threshold and in the
//! `severity` attribute. [`LogLevel`] is the stock implementation; applications
//! may plug in their own enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A level type usable as a record severity
///
/// Implementations must round-trip: `Self::from_raw(x.as_raw()) == Some(x)`
/// for every value `x`. Thresholds are stored as raw integers and converted
/// back with `from_raw`, so a type that breaks this makes
/// [`SeverityLogger::verbosity`](crate::core::SeverityLogger::verbosity) panic.
pub trait Severity: Copy + Send + Sync + 'static {
    /// Integer representation; higher is more severe.
    fn as_raw(self) -> i64;

    /// Inverse of [`as_raw`](Severity::as_raw); `None` for values no level maps to.
    fn from_raw(raw: i64) -> Option<Self>;
}

impl Severity for i64 {
    fn as_raw(self) -> i64 {
        self
    }

    fn from_raw(raw: i64) -> Option<Self> {
        Some(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl Severity for LogLevel {
    fn as_raw(self) -> i64 {
        self as i64
    }

    fn from_raw(raw: i64) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|idx| LogLevel::ALL.get(idx).copied())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
