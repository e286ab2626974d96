//! Timestamp formatting for text frontends
//!
//! Records carry their timestamp as microseconds since the Unix epoch; text
//! frontends render it with one of these formats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use rust_attr_logger::core::TimestampFormat;
///
/// let format = TimestampFormat::UnixMillis;
/// assert_eq!(format.format_micros(1_736_332_245_123_456), "1736332245123");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    Unix,

    UnixMillis,

    UnixMicros,

    /// Any strftime-compatible format string
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    // unknown specifier in a user pattern
                    Err(_) => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
                }
            }
        }
    }

    /// Format a raw `timestamp` attribute; out-of-range values are printed as-is
    #[must_use]
    pub fn format_micros(&self, micros: i64) -> String {
        match DateTime::from_timestamp_micros(micros) {
            Some(datetime) => self.format(&datetime),
            None => micros.to_string(),
        }
    }
}
