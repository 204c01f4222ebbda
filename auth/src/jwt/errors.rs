use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures are kept apart so they can be told apart in logs.
/// Callers facing the network should collapse them into one response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Unexpected signing algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("Token signature does not match")]
    SignatureMismatch,

    #[error("Token is expired")]
    TokenExpired,
}

impl JwtError {
    /// Stable, low-cardinality label for structured logging.
    pub fn reason(&self) -> &'static str {
        match self {
            JwtError::EncodingFailed(_) => "encoding_failed",
            JwtError::Malformed(_) => "malformed",
            JwtError::UnexpectedAlgorithm(_) => "unexpected_algorithm",
            JwtError::SignatureMismatch => "signature_mismatch",
            JwtError::TokenExpired => "expired",
        }
    }
}
