use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::Duration;
use chrono::Utc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PasswordResetToken;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::PasswordResetNotifier;
use crate::user::ports::PasswordResetRepository;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Domain service implementation for user operations.
///
/// Argon2 work runs on the blocking thread pool so a slow hash never stalls
/// the async workers serving other requests.
pub struct UserService<UR, PR, N>
where
    UR: UserRepository,
    PR: PasswordResetRepository,
    N: PasswordResetNotifier,
{
    repository: Arc<UR>,
    reset_tokens: Arc<PR>,
    notifier: Arc<N>,
    password_hasher: PasswordHasher,
    reset_token_ttl: Duration,
    decoy_hash: OnceCell<String>,
}

impl<UR, PR, N> UserService<UR, PR, N>
where
    UR: UserRepository,
    PR: PasswordResetRepository,
    N: PasswordResetNotifier,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `reset_tokens` - Password-reset grant persistence
    /// * `notifier` - Delivery of reset tokens
    /// * `password_hasher` - Configured credential hasher
    pub fn new(
        repository: Arc<UR>,
        reset_tokens: Arc<PR>,
        notifier: Arc<N>,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            reset_tokens,
            notifier,
            password_hasher,
            reset_token_ttl: Duration::minutes(DEFAULT_RESET_TOKEN_TTL_MINUTES),
            decoy_hash: OnceCell::new(),
        }
    }

    /// Change how long reset tokens stay redeemable.
    pub fn with_reset_token_ttl(mut self, ttl: Duration) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let hasher = self.password_hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    /// Hash compared against when no account matches an email, so a miss costs
    /// as much as a wrong password. Built once with the configured hasher.
    async fn decoy_hash(&self) -> Result<String, UserError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash_password(auth::url_safe_token()))
            .await
            .cloned()
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, UserError> {
        let hasher = self.password_hasher.clone();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
            .map_err(UserError::from)
    }
}

#[async_trait]
impl<UR, PR, N> UserServicePort for UserService<UR, PR, N>
where
    UR: UserRepository,
    PR: PasswordResetRepository,
    N: PasswordResetNotifier,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let password_hash = self.hash_password(command.password.into_inner()).await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn verify_credentials(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<User, UserError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            let decoy = self.decoy_hash().await?;
            self.verify_password(password.to_string(), decoy).await?;
            tracing::debug!("Login attempt for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?
        {
            Ok(user)
        } else {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            Err(UserError::InvalidCredentials)
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(id).await?;

        if let Some(new_name) = command.name {
            user.name = new_name;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        user.updated_at = Utc::now();

        self.repository.update(user).await
    }

    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError> {
        let user = self.get_user(id).await?;

        if !self
            .verify_password(command.current_password, user.password_hash)
            .await?
        {
            return Err(UserError::InvalidCredentials);
        }

        let password_hash = self
            .hash_password(command.new_password.into_inner())
            .await?;
        self.repository
            .update_password(id, &password_hash, Utc::now())
            .await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), UserError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            self.hash_password(auth::url_safe_token()).await?;
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let secret = auth::url_safe_token();
        let token_hash = self.hash_password(secret.clone()).await?;

        let now = Utc::now();
        let token = PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash,
            expires_at: now + self.reset_token_ttl,
            used_at: None,
            created_at: now,
        };
        let raw_token = PasswordResetToken::format_raw(token.id, &secret);

        self.reset_tokens.create(token).await?;

        if let Err(e) = self.notifier.send_reset_token(&user, &raw_token).await {
            tracing::error!(user_id = %user.id, error = %e, "Failed to deliver password reset token");
        }

        Ok(())
    }

    async fn reset_password(
        &self,
        raw_token: &str,
        new_password: Password,
    ) -> Result<(), UserError> {
        let (token_id, secret) =
            PasswordResetToken::parse_raw(raw_token).ok_or(UserError::InvalidResetToken)?;

        let token = self
            .reset_tokens
            .find_by_id(&token_id)
            .await?
            .ok_or(UserError::InvalidResetToken)?;

        let now = Utc::now();
        if !token.is_redeemable(now) {
            tracing::warn!(token_id = %token.id, "Reset token already used or expired");
            return Err(UserError::InvalidResetToken);
        }

        if !self
            .verify_password(secret.to_string(), token.token_hash.clone())
            .await?
        {
            tracing::warn!(token_id = %token.id, "Reset token secret does not match");
            return Err(UserError::InvalidResetToken);
        }

        let password_hash = self.hash_password(new_password.into_inner()).await?;

        // Consume first so two concurrent redemptions cannot both succeed
        if !self.reset_tokens.mark_used(&token.id, now).await? {
            return Err(UserError::InvalidResetToken);
        }

        if let Err(e) = self
            .repository
            .update_password(&token.user_id, &password_hash, now)
            .await
        {
            tracing::error!(
                token_id = %token.id,
                user_id = %token.user_id,
                error = %e,
                "Reset token consumed but password update failed"
            );
            return Err(e);
        }

        tracing::info!(user_id = %token.user_id, "Password reset completed");
        Ok(())
    }
}
