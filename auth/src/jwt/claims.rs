use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity token claims.
///
/// Carries the registered RFC 7519 claims this service relies on. Every field
/// is required when a token is decoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create claims for a subject, valid from `now` for `lifetime`.
    ///
    /// # Arguments
    /// * `subject` - Unique subject identifier
    /// * `issuer` - Name of the issuing service
    /// * `now` - Issue instant
    /// * `lifetime` - How long the token stays valid
    pub fn new(
        subject: impl ToString,
        issuer: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: issuer.into(),
        }
    }
}
