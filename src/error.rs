//! Custom error types for the change-log engine
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::audit::ChangeLog;

/// The main error type for change-log operations
#[derive(Error, Debug)]
pub enum LoggableError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Change-log persistence errors (write path, query path, lock poisoning)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A declared trackable field does not exist on the entity shape
    #[error("Schema error for {object_type}: {message}")]
    Schema {
        object_type: String,
        message: String,
    },

    /// Some change-log writes of a multi-entity hook failed
    ///
    /// `written` holds the rows that did persist; `first` is the first
    /// write error encountered.
    #[error("{failed} change log write(s) failed, {} written: {first}", .written.len())]
    PartialWrite {
        written: Vec<ChangeLog>,
        failed: usize,
        first: Box<LoggableError>,
    },

    /// Record not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl LoggableError {
    /// Create a "not found" error for change-log records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Change log",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Rows a failed multi-entity hook did manage to persist
    pub fn written(&self) -> &[ChangeLog] {
        match self {
            Self::PartialWrite { written, .. } => written,
            _ => &[],
        }
    }
}

impl From<std::io::Error> for LoggableError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LoggableError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for change-log operations
pub type LoggableResult<T> = Result<T, LoggableError>;
