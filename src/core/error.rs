//! Error types for the logging core

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    Formatter {
        format_type: String,
        message: String,
    },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    Writer(String),

    /// Queued frontend rejected a record
    #[error("Frontend queue full: {capacity} records buffered")]
    QueueFull { capacity: usize },

    /// Queued frontend worker is gone
    #[error("Frontend '{name}' already stopped")]
    FrontendStopped { name: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Registry has no factory for the requested component type
    #[error("Unknown {kind} type '{name}'")]
    UnknownComponent { kind: String, name: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Formatter {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::Writer(msg.into())
    }

    pub fn queue_full(capacity: usize) -> Self {
        LoggerError::QueueFull { capacity }
    }

    pub fn frontend_stopped(name: impl Into<String>) -> Self {
        LoggerError::FrontendStopped { name: name.into() }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an unknown component error, raised by registry lookups
    pub fn unknown_component(kind: impl Into<String>, name: impl Into<String>) -> Self {
        LoggerError::UnknownComponent {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
