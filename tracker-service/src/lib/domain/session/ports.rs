use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::models::CreateSessionCommand;
use crate::domain::session::models::Session;
use crate::domain::session::models::SessionId;
use crate::domain::session::models::ShareToken;
use crate::domain::session::models::SharedSession;
use crate::domain::session::models::UpdateSessionCommand;
use crate::domain::user::models::UserId;
use crate::session::errors::SessionError;

/// Port for session domain service operations.
///
/// Every owner-scoped operation treats a session belonging to someone else
/// exactly like a missing one.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Sessions of `owner`, most recent `session_date` first.
    async fn list_sessions(&self, owner: &UserId) -> Result<Vec<Session>, SessionError>;

    async fn create_session(
        &self,
        owner: &UserId,
        command: CreateSessionCommand,
    ) -> Result<Session, SessionError>;

    /// # Errors
    /// * `NotFound` - No such session for this owner
    async fn get_session(&self, owner: &UserId, id: &SessionId) -> Result<Session, SessionError>;

    /// # Errors
    /// * `NotFound` - No such session for this owner
    async fn update_session(
        &self,
        owner: &UserId,
        id: &SessionId,
        command: UpdateSessionCommand,
    ) -> Result<Session, SessionError>;

    /// Delete a session and, through the cascade, its tallies.
    ///
    /// # Errors
    /// * `NotFound` - No such session for this owner
    async fn delete_session(&self, owner: &UserId, id: &SessionId) -> Result<(), SessionError>;

    /// Make a session publicly readable, reusing its token if already shared.
    async fn share_session(
        &self,
        owner: &UserId,
        id: &SessionId,
    ) -> Result<ShareToken, SessionError>;

    /// Revoke public access. Unsharing an unshared session succeeds.
    async fn unshare_session(&self, owner: &UserId, id: &SessionId) -> Result<(), SessionError>;

    /// Public read of a shared session.
    ///
    /// # Errors
    /// * `SharedNotFound` - No session carries this token
    async fn get_shared_session(&self, token: &str) -> Result<SharedSession, SessionError>;
}

/// Persistence operations for sessions.
///
/// Every returned `Session` carries its computed `error_count`.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    async fn create(&self, session: Session) -> Result<Session, SessionError>;

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, SessionError>;

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Session>, SessionError>;

    /// Persist name, opponent, date and `updated_at`.
    ///
    /// # Errors
    /// * `NotFound` - Session does not exist
    async fn update(&self, session: Session) -> Result<Session, SessionError>;

    /// # Errors
    /// * `NotFound` - Session does not exist
    async fn delete(&self, id: &SessionId) -> Result<(), SessionError>;

    async fn set_share_token(
        &self,
        id: &SessionId,
        token: Option<ShareToken>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), SessionError>;

    async fn find_by_share_token(&self, token: &str) -> Result<Option<Session>, SessionError>;
}
