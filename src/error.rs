//! Error types for tasksched
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, unknown task id, edit session misuse)
//! - 4: Operation failed (store unreadable or unwritable, I/O)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tasksched CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tasksched operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Task not found: {0}")]
    NotFound(u32),

    #[error("Task {0} is already being edited")]
    EditInProgress(u32),

    #[error("No task is being edited")]
    NoActiveEdit,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Operation failures (exit code 4)
    #[error("Task store {path} is unreadable: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("Failed to write task store {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Shorthand for a validation failure on a named input field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::Validation { .. }
            | Error::NotFound(_)
            | Error::EditInProgress(_)
            | Error::NoActiveEdit
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::StoreCorrupt { .. }
            | Error::StoreWrite { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlSerialize(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Whether the store was left untouched and the caller can simply retry
    /// with corrected input.
    pub fn is_recoverable(&self) -> bool {
        self.exit_code() == exit_codes::USER_ERROR
    }

    /// Structured fields for the JSON error envelope
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation { field, message } => Some(serde_json::json!({
                "field": field,
                "message": message,
            })),
            Error::NotFound(id) | Error::EditInProgress(id) => {
                Some(serde_json::json!({ "id": id }))
            }
            Error::StoreCorrupt { path, reason } => Some(serde_json::json!({
                "path": path.to_string_lossy(),
                "reason": reason,
            })),
            Error::StoreWrite { path, source } => Some(serde_json::json!({
                "path": path.to_string_lossy(),
                "reason": source.to_string(),
            })),
            Error::InvalidConfig(message) | Error::InvalidArgument(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            _ => None,
        }
    }
}

/// Result type alias for tasksched operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
