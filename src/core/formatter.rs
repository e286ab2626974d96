//! Pattern-based text formatting
//!
//! A pattern is literal text with placeholders in braces. `{{` and `}}`
//! produce literal braces.
//!
//! | placeholder            | renders                                              |
//! |------------------------|------------------------------------------------------|
//! | `{message}`            | first caller-supplied `message`                      |
//! | `{severity}`           | level name, `{severity:5}` pads to 5 columns         |
//! | `{severity:d}`         | raw severity number                                  |
//! | `{timestamp}`          | timestamp in the formatter's [`TimestampFormat`]     |
//! | `{timestamp:d}`        | microseconds since the Unix epoch                    |
//! | `{timestamp:%H:%M:%S}` | any strftime pattern                                 |
//! | `{pid}` `{tid}` `{lwp}`| process, thread and lightweight-process ids          |
//! | `{name}`               | first attribute called `name`, `{name:8}` pads       |
//! | `{...}`                | every attribute no other placeholder rendered, each as ` name=value` |
//!
//! Placeholders consume the attribute they render, by position: `{severity}`
//! consumes the internal `severity` attribute but not a caller attribute of
//! the same name, which `{...}` still prints. Missing attributes render as `-`
//! (`{message}` renders nothing). Line breaks and tabs in names and string
//! values are escaped, so one record always yields one line.
//!
//! ```
//! use rust_attr_logger::core::StringFormatter;
//! use rust_attr_logger::prelude::*;
//!
//! let formatter = StringFormatter::new("{severity:d}|{message}{...}").unwrap();
//! let logger = SeverityLogger::new(LogLevel::Trace);
//! let record = logger.open_record(
//!     LogLevel::Warn,
//!     AttributeSet::new().with("message", "disk full").with("mount", "/var"),
//! );
//! assert!(formatter.format(&record).starts_with("3|disk full"));
//! assert!(formatter.format(&record).ends_with(" mount=/var"));
//! ```

use super::attribute::{names, AttributeSet, Value};
use super::error::{LoggerError, Result};
use super::record::Record;
use super::severity::{LogLevel, Severity};
use super::timestamp::TimestampFormat;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write as _;

/// Layout used by [`StringFormatter::default`]
pub const DEFAULT_PATTERN: &str = "[{timestamp}] [{severity:5}] [{tid}] {message}{...}";

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Message { width: usize },
    Severity { numeric: bool, width: usize },
    /// `None` uses the formatter's configured format
    Timestamp(Option<TimestampFormat>),
    Internal { name: &'static str, width: usize },
    Attribute { name: String, width: usize },
    Leftover,
}

#[derive(Debug, Clone)]
pub struct StringFormatter {
    pattern: String,
    tokens: Vec<Token>,
    timestamp_format: TimestampFormat,
    colors: bool,
}

impl StringFormatter {
    /// Parse `pattern`; malformed placeholders yield a `Formatter` error
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let tokens = parse(&pattern)?;
        Ok(Self {
            pattern,
            tokens,
            timestamp_format: TimestampFormat::default(),
            colors: false,
        })
    }

    /// Swap in a new layout, keeping colors and the timestamp format
    pub fn with_pattern(self, pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let tokens = parse(&pattern)?;
        Ok(Self {
            pattern,
            tokens,
            ..self
        })
    }

    /// Color the level name (feature `console`; ignored otherwise)
    #[must_use]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Format used by a bare `{timestamp}`
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, record: &Record<'_>) -> String {
        let consumed = self.consumed(record);
        let mut output = String::with_capacity(128);

        for token in &self.tokens {
            match token {
                Token::Literal(text) => output.push_str(text),
                Token::Message { width } => {
                    let message = record
                        .external()
                        .get(names::MESSAGE)
                        .map(render_value)
                        .unwrap_or_default();
                    pad(&mut output, &message, *width);
                }
                Token::Severity { numeric, width } => {
                    self.render_severity(&mut output, record, *numeric, *width)
                }
                Token::Timestamp(format) => {
                    let text = match record.internal().get(names::TIMESTAMP).and_then(Value::as_i64) {
                        Some(micros) => format
                            .as_ref()
                            .unwrap_or(&self.timestamp_format)
                            .format_micros(micros),
                        None => "-".to_string(),
                    };
                    output.push_str(&text);
                }
                Token::Internal { name, width } => {
                    let text = record.internal().get(name).map_or_else(|| "-".to_string(), render_value);
                    pad(&mut output, &text, *width);
                }
                Token::Attribute { name, width } => {
                    let text = record.get(name).map_or_else(|| "-".to_string(), render_value);
                    pad(&mut output, &text, *width);
                }
                Token::Leftover => {
                    for (attr, used) in record.attributes().iter().zip(&consumed) {
                        if *used {
                            continue;
                        }
                        output.push(' ');
                        output.push_str(&sanitize(&attr.name));
                        output.push('=');
                        output.push_str(&render_value(&attr.value));
                    }
                }
            }
        }

        output
    }

    /// Flags, in combined-view order, for attributes rendered by a placeholder
    fn consumed(&self, record: &Record<'_>) -> Vec<bool> {
        if !self.tokens.contains(&Token::Leftover) {
            return Vec::new();
        }

        let internal_len = record.internal().len();
        let mut consumed = vec![false; internal_len + record.external().len()];
        for token in &self.tokens {
            let index = match token {
                Token::Message { .. } => {
                    position(record.external(), names::MESSAGE).map(|i| internal_len + i)
                }
                Token::Severity { .. } => position(record.internal(), names::SEVERITY),
                Token::Timestamp(_) => position(record.internal(), names::TIMESTAMP),
                Token::Internal { name, .. } => position(record.internal(), name),
                Token::Attribute { name, .. } => position(record.internal(), name)
                    .or_else(|| position(record.external(), name).map(|i| internal_len + i)),
                Token::Literal(_) | Token::Leftover => None,
            };
            if let Some(index) = index {
                consumed[index] = true;
            }
        }
        consumed
    }

    fn render_severity(&self, output: &mut String, record: &Record<'_>, numeric: bool, width: usize) {
        let Some(raw) = record.internal().get(names::SEVERITY) else {
            pad(output, "-", width);
            return;
        };
        if numeric {
            output.push_str(&render_value(raw));
            return;
        }
        match raw.as_i64().and_then(LogLevel::from_raw) {
            Some(level) => {
                let mut name = String::new();
                pad(&mut name, level.to_str(), width);
                output.push_str(&self.paint(level, name));
            }
            None => pad(output, &render_value(raw), width),
        }
    }

    #[cfg(feature = "console")]
    fn paint(&self, level: LogLevel, text: String) -> String {
        use colored::Colorize;

        if self.colors {
            text.color(level.color_code()).to_string()
        } else {
            text
        }
    }

    #[cfg(not(feature = "console"))]
    fn paint(&self, _level: LogLevel, text: String) -> String {
        text
    }
}

impl Default for StringFormatter {
    /// Same layout as [`DEFAULT_PATTERN`]
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            tokens: vec![
                Token::Literal("[".to_string()),
                Token::Timestamp(None),
                Token::Literal("] [".to_string()),
                Token::Severity { numeric: false, width: 5 },
                Token::Literal("] [".to_string()),
                Token::Internal { name: names::TID, width: 0 },
                Token::Literal("] ".to_string()),
                Token::Message { width: 0 },
                Token::Leftover,
            ],
            timestamp_format: TimestampFormat::default(),
            colors: false,
        }
    }
}

fn position(set: &AttributeSet<'_>, name: &str) -> Option<usize> {
    set.iter().position(|attr| attr.name == name)
}

fn pad(output: &mut String, text: &str, width: usize) {
    let _ = write!(output, "{:<width$}", text, width = width);
}

fn render_value(value: &Value<'_>) -> String {
    match value {
        Value::Str(s) => sanitize(s),
        other => other.to_string(),
    }
}

/// Escape line breaks and tabs so one record stays on one line
fn sanitize(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn invalid(message: impl Into<String>) -> LoggerError {
    LoggerError::formatter("pattern", message)
}

fn parse(pattern: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, next)| next) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, next)| next) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) => body.push(c),
                        None => {
                            return Err(invalid(format!("unclosed placeholder at offset {}", offset)))
                        }
                    }
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(placeholder(&body)?);
            }
            '}' => return Err(invalid(format!("unmatched '}}' at offset {}", offset))),
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

fn placeholder(body: &str) -> Result<Token> {
    let (name, spec) = match body.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (body, None),
    };

    match name {
        "" => Err(invalid("empty placeholder")),
        "..." if spec.is_some() => Err(invalid("'{...}' takes no format spec")),
        "..." => Ok(Token::Leftover),
        names::MESSAGE => Ok(Token::Message { width: width(spec)? }),
        names::SEVERITY if spec == Some("d") => Ok(Token::Severity { numeric: true, width: 0 }),
        names::SEVERITY => Ok(Token::Severity { numeric: false, width: width(spec)? }),
        names::TIMESTAMP => match spec {
            None => Ok(Token::Timestamp(None)),
            Some("d") => Ok(Token::Timestamp(Some(TimestampFormat::UnixMicros))),
            Some(strftime) => {
                if strftime.is_empty()
                    || StrftimeItems::new(strftime).any(|item| matches!(item, Item::Error))
                {
                    return Err(invalid(format!("invalid timestamp pattern '{}'", strftime)));
                }
                Ok(Token::Timestamp(Some(TimestampFormat::Custom(strftime.to_string()))))
            }
        },
        names::PID => Ok(Token::Internal { name: names::PID, width: width(spec)? }),
        names::TID => Ok(Token::Internal { name: names::TID, width: width(spec)? }),
        names::LWP => Ok(Token::Internal { name: names::LWP, width: width(spec)? }),
        other => Ok(Token::Attribute {
            name: other.to_string(),
            width: width(spec)?,
        }),
    }
}

fn width(spec: Option<&str>) -> Result<usize> {
    match spec {
        None => Ok(0),
        Some(spec) => spec
            .parse()
            .map_err(|_| invalid(format!("invalid width '{}'", spec))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttributeSet, Logger, SeverityLogger};

    fn record(external: AttributeSet<'static>) -> Record<'static> {
        SeverityLogger::new(LogLevel::Trace).open_record(LogLevel::Info, external)
    }

    #[test]
    fn test_default_matches_default_pattern() {
        let parsed = StringFormatter::new(DEFAULT_PATTERN).unwrap();
        assert_eq!(parsed.tokens, StringFormatter::default().tokens);
    }

    #[test]
    fn test_placeholders() {
        let formatter =
            StringFormatter::new("{timestamp:d} {severity:d} {severity} {pid} <{message:6}>").unwrap();
        let record = record(AttributeSet::new().with("message", "hi"));
        let line = formatter.format(&record);

        let micros = record.internal().get(names::TIMESTAMP).and_then(Value::as_i64).unwrap();
        assert!(line.starts_with(&format!("{} 2 INFO ", micros)));
        assert!(line.ends_with("<hi    >"));
    }

    #[test]
    fn test_user_timestamp_pattern() {
        let formatter = StringFormatter::new("{timestamp:%Y}").unwrap();
        let line = formatter.format(&record(AttributeSet::new()));
        assert_eq!(line.len(), 4);
        assert!(line.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_leftover_keeps_caller_duplicates() {
        let formatter = StringFormatter::new("{severity}|{message}|{...}").unwrap();
        let record = record(
            AttributeSet::new()
                .with("message", "first")
                .with("message", "second")
                .with("severity", "caller"),
        );
        let line = formatter.format(&record);

        assert!(line.starts_with("INFO|first|"));
        assert!(line.ends_with(" message=second severity=caller"));
        assert!(!line.contains("message=first"));
    }

    #[test]
    fn test_generic_attribute_is_consumed_once() {
        let formatter = StringFormatter::new("{user:5}|{missing}{...}").unwrap();
        let record = Logger::new().open(AttributeSet::new().with("user", "bob").with("user", "eve"));
        let line = formatter.format(&record);
        assert!(line.starts_with("bob  |-"));
        assert!(line.ends_with(" user=eve"));
    }

    #[test]
    fn test_names_and_values_are_escaped() {
        let formatter = StringFormatter::default();
        let record = record(
            AttributeSet::new()
                .with("message", "a\nb")
                .with("x\n[FATAL] forged", 1)
                .with("tab", "c\td"),
        );
        let line = formatter.format(&record);
        assert_eq!(line.lines().count(), 1);
        assert!(line.contains("x\\n[FATAL] forged=1"));
        assert!(line.contains("tab=c\\td"));
    }

    #[test]
    fn test_escaped_braces() {
        let formatter = StringFormatter::new("{{{message}}}").unwrap();
        let line = formatter.format(&record(AttributeSet::new().with("message", "m")));
        assert_eq!(line, "{m}");
    }

    #[test]
    fn test_malformed_patterns_are_rejected() {
        for pattern in ["{message", "message}", "{}", "{severity:wide}", "{...:x}", "{timestamp:%Q}"] {
            let err = StringFormatter::new(pattern).unwrap_err();
            assert!(
                matches!(err, LoggerError::Formatter { .. }),
                "pattern {:?} gave {:?}",
                pattern,
                err
            );
        }
    }
}
