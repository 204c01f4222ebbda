use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordHasher;

/// Issuer written into and required from every token by default.
pub const DEFAULT_ISSUER: &str = "tennis-tracker";

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Authentication coordinator combining the credential hasher and the token codec.
///
/// Built once at startup from configuration and shared read-only between
/// requests. Holds no mutable state.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    issuer: String,
    token_lifetime: Duration,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// Tokens are issued by [`DEFAULT_ISSUER`] and live for
    /// [`DEFAULT_TOKEN_LIFETIME_HOURS`]; passwords use the default Argon2 cost.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret).with_issuer(DEFAULT_ISSUER),
            issuer: DEFAULT_ISSUER.to_string(),
            token_lifetime: Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS),
        }
    }

    /// Issue and require tokens from a different issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self.jwt_handler = self.jwt_handler.with_issuer(&self.issuer);
        self
    }

    /// Change how long newly issued tokens stay valid.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Replace the password hasher (e.g. to tune the Argon2 cost).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    /// The configured password hasher.
    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    /// Issue a signed identity token for `subject`, valid from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token(&self, subject: impl ToString) -> Result<String, JwtError> {
        self.issue_token_at(subject, Utc::now())
    }

    /// Issue a signed identity token as if the clock read `now`.
    ///
    /// Deterministic: identical inputs produce identical tokens.
    pub fn issue_token_at(
        &self,
        subject: impl ToString,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(subject, self.issuer.clone(), now, self.token_lifetime);
        self.jwt_handler.encode(&claims)
    }

    /// Verify a token and return the subject it was issued for.
    ///
    /// Every call re-checks algorithm, signature and expiry. Nothing is cached.
    ///
    /// # Errors
    /// * `Malformed`, `UnexpectedAlgorithm`, `SignatureMismatch`, `TokenExpired`
    pub fn verify_token(&self, token: &str) -> Result<String, JwtError> {
        self.jwt_handler
            .decode::<Claims>(token)
            .map(|claims| claims.sub)
    }
}
