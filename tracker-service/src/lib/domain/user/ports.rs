use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PasswordResetToken;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::NotifierError;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user and store the hash of their password.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Look up a user by email and check the password against the stored hash.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No such user, or password does not match
    /// * `Password` - Stored hash is malformed
    /// * `DatabaseError` - Database operation failed
    async fn verify_credentials(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Update profile fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Replace the password of a user who knows the current one.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Current password does not match
    /// * `NotFound` - User does not exist
    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError>;

    /// Start a password reset for `email`.
    ///
    /// Succeeds whether or not the email belongs to an account.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), UserError>;

    /// Redeem a raw reset token and set a new password.
    ///
    /// # Errors
    /// * `InvalidResetToken` - Token is unknown, used, expired or does not match
    async fn reset_password(&self, raw_token: &str, new_password: Password)
        -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier (None if not found).
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address (None if not found).
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Update name, email and `updated_at` of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Replace the stored password hash.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError>;
}

/// Persistence operations for password-reset grants.
#[async_trait]
pub trait PasswordResetRepository: Send + Sync + 'static {
    async fn create(&self, token: PasswordResetToken) -> Result<(), UserError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<PasswordResetToken>, UserError>;

    /// Mark the token used if it is not already.
    ///
    /// # Returns
    /// `true` if this call consumed the token, `false` if it was already used
    async fn mark_used(&self, id: &Uuid, used_at: DateTime<Utc>) -> Result<bool, UserError>;
}

/// Delivery of password-reset tokens to their owner.
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync + 'static {
    /// Deliver `raw_token` to `user`.
    ///
    /// # Errors
    /// * `DeliveryFailed` - The token could not be handed off
    async fn send_reset_token(&self, user: &User, raw_token: &str) -> Result<(), NotifierError>;
}
