use thiserror::Error;

use crate::session::errors::SessionError;

/// Error for ErrorTallyId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErrorTallyIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErrorTypeError {
    #[error("Error type must not be empty")]
    Empty,

    #[error("Error type too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErrorCountError {
    #[error("Count must be between {min} and {max}, got {actual}")]
    OutOfRange { min: i32, max: i32, actual: i64 },
}

/// Top-level error for error-tally operations
#[derive(Debug, Clone, Error)]
pub enum ErrorTallyError {
    #[error("Invalid error ID: {0}")]
    InvalidErrorTallyId(#[from] ErrorTallyIdError),

    #[error("Invalid error type: {0}")]
    InvalidErrorType(#[from] ErrorTypeError),

    #[error("Invalid count: {0}")]
    InvalidCount(#[from] ErrorCountError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Error not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<SessionError> for ErrorTallyError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => ErrorTallyError::SessionNotFound(id),
            SessionError::DatabaseError(msg) => ErrorTallyError::DatabaseError(msg),
            other => ErrorTallyError::Unknown(other.to_string()),
        }
    }
}
