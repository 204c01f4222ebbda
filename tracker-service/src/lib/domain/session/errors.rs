use thiserror::Error;

use crate::tally::errors::ErrorTallyError;

/// Error for SessionId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for session and opponent name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionNameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error for all session-related operations
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid session ID: {0}")]
    InvalidSessionId(#[from] SessionIdError),

    #[error("Invalid session name: {0}")]
    InvalidName(#[from] SessionNameError),

    #[error("Invalid opponent name: {0}")]
    InvalidOpponentName(SessionNameError),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Shared session not found")]
    SharedNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<ErrorTallyError> for SessionError {
    fn from(err: ErrorTallyError) -> Self {
        match err {
            ErrorTallyError::DatabaseError(msg) => SessionError::DatabaseError(msg),
            other => SessionError::Unknown(other.to_string()),
        }
    }
}
