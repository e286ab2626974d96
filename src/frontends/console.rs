//! Console frontend implementation

use crate::core::{
    attribute::names, Frontend, LogLevel, Record, Result, Severity, StringFormatter,
    TimestampFormat, Value,
};
use std::io::Write;

pub struct ConsoleFrontend {
    formatter: StringFormatter,
}

impl ConsoleFrontend {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            formatter: StringFormatter::default().with_colors(use_colors),
        }
    }

    /// Set the timestamp format for this frontend
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_attr_logger::frontends::ConsoleFrontend;
    /// use rust_attr_logger::TimestampFormat;
    ///
    /// let frontend = ConsoleFrontend::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601Micros);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.formatter = self.formatter.with_timestamp_format(format);
        self
    }

    /// Replace the line layout, keeping the color and timestamp settings
    ///
    /// ```
    /// use rust_attr_logger::frontends::ConsoleFrontend;
    ///
    /// let frontend = ConsoleFrontend::with_colors(false)
    ///     .with_pattern("{timestamp:%H:%M:%S} {severity} {message}{...}")
    ///     .unwrap();
    /// assert!(ConsoleFrontend::new().with_pattern("{message").is_err());
    /// ```
    pub fn with_pattern(self, pattern: &str) -> Result<Self> {
        Ok(Self {
            formatter: self.formatter.with_pattern(pattern)?,
        })
    }

    pub fn with_formatter(formatter: StringFormatter) -> Self {
        Self { formatter }
    }

    pub fn formatter(&self) -> &StringFormatter {
        &self.formatter
    }

    /// `[timestamp] [LEVEL] [thread] message name=value ...` unless a pattern was set
    pub fn format_text(&self, record: &Record<'_>) -> String {
        self.formatter.format(record)
    }
}

impl Default for ConsoleFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for ConsoleFrontend {
    fn handle(&self, record: &Record<'_>) -> Result<()> {
        let output = self.format_text(record);

        // Route Error and Fatal levels to stderr, others to stdout
        let to_stderr = record
            .internal()
            .get(names::SEVERITY)
            .and_then(Value::as_i64)
            .is_some_and(|raw| raw >= LogLevel::Error.as_raw());
        if to_stderr {
            writeln!(std::io::stderr().lock(), "{}", output)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", output)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
