use async_trait::async_trait;

use crate::domain::session::models::SessionId;
use crate::domain::tally::models::CreateErrorTallyCommand;
use crate::domain::tally::models::ErrorTally;
use crate::domain::tally::models::ErrorTallyId;
use crate::domain::tally::models::UpdateErrorTallyCommand;
use crate::domain::user::models::UserId;
use crate::tally::errors::ErrorTallyError;

/// Port for error-tally operations, always nested under a session of `owner`.
#[async_trait]
pub trait ErrorTallyServicePort: Send + Sync + 'static {
    /// Tallies of a session, oldest first.
    ///
    /// # Errors
    /// * `SessionNotFound` - No such session for this owner
    async fn list_tallies(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<Vec<ErrorTally>, ErrorTallyError>;

    async fn create_tally(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        command: CreateErrorTallyCommand,
    ) -> Result<ErrorTally, ErrorTallyError>;

    /// # Errors
    /// * `SessionNotFound` - No such session for this owner
    /// * `NotFound` - No such tally in that session
    async fn update_tally(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        id: &ErrorTallyId,
        command: UpdateErrorTallyCommand,
    ) -> Result<ErrorTally, ErrorTallyError>;

    async fn delete_tally(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        id: &ErrorTallyId,
    ) -> Result<(), ErrorTallyError>;
}

/// Persistence operations for error tallies.
#[async_trait]
pub trait ErrorTallyRepository: Send + Sync + 'static {
    async fn create(&self, tally: ErrorTally) -> Result<ErrorTally, ErrorTallyError>;

    async fn find_by_id(&self, id: &ErrorTallyId) -> Result<Option<ErrorTally>, ErrorTallyError>;

    /// Ordered by `created_at` ascending.
    async fn list_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ErrorTally>, ErrorTallyError>;

    /// # Errors
    /// * `NotFound` - Tally does not exist
    async fn update(&self, tally: ErrorTally) -> Result<ErrorTally, ErrorTallyError>;

    /// # Errors
    /// * `NotFound` - Tally does not exist
    async fn delete(&self, id: &ErrorTallyId) -> Result<(), ErrorTallyError>;
}
