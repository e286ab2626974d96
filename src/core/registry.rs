//! Assembling loggers from configuration
//!
//! A [`Registry`] maps frontend type names to factories. [`LoggerConfig`] is a
//! plain deserializable description; reading it from a file or environment
//! is up to the application.
//!
//! ```
//! use rust_attr_logger::core::{LoggerConfig, Registry};
//! use rust_attr_logger::LogLevel;
//!
//! let config: LoggerConfig = serde_json::from_str(
//!     r#"{ "threshold": "warning", "frontends": [ { "type": "memory" } ] }"#,
//! ).unwrap();
//!
//! let logger = Registry::configured().build(&config).unwrap();
//! assert_eq!(logger.verbosity(), LogLevel::Warn);
//! assert_eq!(logger.frontend_count(), 1);
//! ```

use super::error::{LoggerError, Result};
use super::frontend::Frontend;
use super::severity::LogLevel;
use super::severity_logger::SeverityLogger;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds one frontend from its configuration
///
/// The registry is passed along so wrapping frontends can build their inner one.
pub type FrontendFactory =
    Arc<dyn Fn(&FrontendConfig, &Registry) -> Result<Box<dyn Frontend>> + Send + Sync>;

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    #[serde(rename = "type")]
    pub kind: String,

    /// Everything except `type`, interpreted by the factory
    #[serde(flatten)]
    pub options: Map<String, JsonValue>,
}

impl FrontendConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: Map::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn str_option(&self, key: &str) -> Result<Option<&str>> {
        match self.options.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.invalid(key, format!("expected a string, got {}", other))),
        }
    }

    pub fn bool_option(&self, key: &str) -> Result<Option<bool>> {
        match self.options.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.invalid(key, format!("expected a boolean, got {}", other))),
        }
    }

    pub fn usize_option(&self, key: &str) -> Result<Option<usize>> {
        match self.options.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    self.invalid(key, format!("expected a non-negative integer, got {}", value))
                }),
        }
    }

    /// Nested frontend configuration stored under `key`
    pub fn nested(&self, key: &str) -> Result<FrontendConfig> {
        let value = self
            .options
            .get(key)
            .ok_or_else(|| self.invalid(key, "missing nested frontend"))?;
        FrontendConfig::deserialize(value).map_err(|e| self.invalid(key, e.to_string()))
    }

    fn invalid(&self, key: &str, message: impl fmt::Display) -> LoggerError {
        LoggerError::config(format!("{}.{}", self.kind, key), message.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Accepts level names case-insensitively, including `warning`
    #[serde(default, deserialize_with = "level_from_str")]
    pub threshold: LogLevel,

    #[serde(default)]
    pub frontends: Vec<FrontendConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            threshold: LogLevel::default(),
            frontends: Vec::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn level_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<LogLevel, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

#[derive(Clone, Default)]
pub struct Registry {
    factories: HashMap<String, FrontendFactory>,
}

impl Registry {
    /// Registry with no frontend types
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with the frontends shipped in this crate
    ///
    /// | type      | options                                   |
    /// |-----------|-------------------------------------------|
    /// | `console` | `colors` (bool), `pattern` (string)       |
    /// | `json`    | `path` (string, stdout if absent), `pretty` |
    /// | `memory`  |                                           |
    /// | `async`   | `inner` (frontend), `capacity`, `policy`  |
    pub fn configured() -> Self {
        let mut registry = Self::empty();

        #[cfg(feature = "console")]
        registry.register("console", |config, _| {
            let colors = config.bool_option("colors")?.unwrap_or(true);
            let frontend = crate::frontends::ConsoleFrontend::with_colors(colors);
            let frontend = match config.str_option("pattern")? {
                Some(pattern) => frontend.with_pattern(pattern)?,
                None => frontend,
            };
            Ok(Box::new(frontend))
        });

        registry.register("json", |config, _| {
            let frontend = match config.str_option("path")? {
                Some(path) => crate::frontends::JsonFrontend::new(path)?,
                None => crate::frontends::JsonFrontend::stdout(),
            };
            let pretty = config.bool_option("pretty")?.unwrap_or(false);
            Ok(Box::new(frontend.pretty(pretty)))
        });

        registry.register("memory", |_, _| {
            Ok(Box::new(crate::frontends::MemoryFrontend::new()))
        });

        registry.register("async", |config, registry| {
            use crate::frontends::{AsyncFrontend, QueuePolicy};

            let inner = registry.build_frontend(&config.nested("inner")?)?;
            let capacity = config.usize_option("capacity")?.unwrap_or(1024);
            if capacity == 0 {
                return Err(config.invalid("capacity", "must be greater than zero"));
            }
            let policy = match config.str_option("policy")? {
                None | Some("drop") => QueuePolicy::DropNewest,
                Some("block") => QueuePolicy::Block,
                Some(other) => {
                    return Err(config.invalid(
                        "policy",
                        format!("unknown policy '{}', expected 'drop' or 'block'", other),
                    ))
                }
            };
            Ok(Box::new(AsyncFrontend::from_boxed(inner, capacity, policy)))
        });

        registry
    }

    /// Add or replace the factory for `kind`
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&FrontendConfig, &Registry) -> Result<Box<dyn Frontend>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
        self
    }

    pub fn frontend(&self, kind: &str) -> Result<&FrontendFactory> {
        self.factories
            .get(kind)
            .ok_or_else(|| LoggerError::unknown_component("frontend", kind))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn build_frontend(&self, config: &FrontendConfig) -> Result<Box<dyn Frontend>> {
        let factory = self.frontend(&config.kind)?;
        factory(config, self)
    }

    /// Build a severity logger; fails on the first frontend that cannot be built
    pub fn build(&self, config: &LoggerConfig) -> Result<SeverityLogger<LogLevel>> {
        let mut builder = SeverityLogger::builder()
            .threshold(config.threshold)
            .enabled(config.enabled);
        for frontend in &config.frontends {
            builder = builder.boxed_frontend(self.build_frontend(frontend)?);
        }
        Ok(builder.build())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("Registry").field("frontends", &kinds).finish()
    }
}
