//! Server error types.

use std::io;
use thiserror::Error;

use eventscheduler_core::ValidationError;

use crate::types::ErrorCode;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the event service.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (snapshot file, config file, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The event payload broke a validation rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No event with this id exists.
    #[error("Event not found: {id}")]
    NotFound { id: String },

    /// The event would overlap an existing one.
    #[error("Event overlaps with existing events (conflicts with {conflicting_id})")]
    Conflict { conflicting_id: String },

    /// The request itself is malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Snapshot file is unreadable or from an unknown format version.
    #[error("Snapshot error at {path}: {message}")]
    Snapshot { path: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a conflict error naming the first overlapping event.
    pub fn conflict(conflicting_id: impl Into<String>) -> Self {
        Self::Conflict {
            conflicting_id: conflicting_id.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a snapshot error.
    pub fn snapshot(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Snapshot {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the wire error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::Io(_) | Self::Json(_) | Self::Snapshot { .. } | Self::Config { .. } => {
                ErrorCode::InternalError
            }
        }
    }
}
