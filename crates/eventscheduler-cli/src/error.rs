//! CLI error types.

use thiserror::Error;

use eventscheduler_server::{ErrorResponse, ServerError};

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or saving configuration or snapshots failed.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// The service rejected the request.
    #[error("{}", .0.message)]
    Rejected(ErrorResponse),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Returns the service error details if the request was rejected.
    pub fn rejection(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Rejected(error) => Some(error),
            _ => None,
        }
    }
}
