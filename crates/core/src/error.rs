//! Error types for sheetsync.

use thiserror::Error;

/// Result type for sheetsync operations.
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Errors that can occur while mirroring or mutating a remote spreadsheet.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// A missing spreadsheet, unknown sheet, or malformed operation input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A batch was submitted without any operations.
    #[error("Requests must not be empty")]
    EmptyBatch,

    /// Error envelope returned in a response body by the remote API.
    #[error("Remote API error (status: {status}, code: {code}): {message}")]
    RemoteApi {
        code: i64,
        status: String,
        message: String,
    },

    /// Network or HTTP failure below the JSON layer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SheetsError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a remote API error from the decoded envelope fields.
    pub fn remote(code: i64, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteApi {
            code,
            status: status.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error was reported by the remote API.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteApi { .. })
    }

    /// Symbolic status of a remote API error (e.g. `INVALID_ARGUMENT`).
    #[must_use]
    pub fn remote_status(&self) -> Option<&str> {
        match self {
            Self::RemoteApi { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SheetsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
