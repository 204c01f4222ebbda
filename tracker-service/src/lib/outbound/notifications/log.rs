use async_trait::async_trait;

use crate::domain::user::models::User;
use crate::domain::user::ports::PasswordResetNotifier;
use crate::user::errors::NotifierError;

/// Hands reset tokens to the operator through the log instead of email.
///
/// The raw token is a credential: this adapter is only suitable where the
/// log stream is as trusted as the user's inbox would be.
#[derive(Debug, Default, Clone)]
pub struct LoggingResetNotifier;

impl LoggingResetNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PasswordResetNotifier for LoggingResetNotifier {
    async fn send_reset_token(&self, user: &User, raw_token: &str) -> Result<(), NotifierError> {
        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            reset_token = raw_token,
            "Password reset requested"
        );
        Ok(())
    }
}
