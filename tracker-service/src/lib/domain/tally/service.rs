use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::session::models::SessionId;
use crate::domain::session::ports::SessionRepository;
use crate::domain::tally::models::CreateErrorTallyCommand;
use crate::domain::tally::models::ErrorTally;
use crate::domain::tally::models::ErrorTallyId;
use crate::domain::tally::models::UpdateErrorTallyCommand;
use crate::domain::user::models::UserId;
use crate::tally::errors::ErrorTallyError;
use crate::tally::ports::ErrorTallyRepository;
use crate::tally::ports::ErrorTallyServicePort;

/// Domain service for error tallies.
///
/// Every call first checks that the session exists and belongs to `owner`.
pub struct ErrorTallyService<TR, SR>
where
    TR: ErrorTallyRepository,
    SR: SessionRepository,
{
    repository: Arc<TR>,
    sessions: Arc<SR>,
}

impl<TR, SR> ErrorTallyService<TR, SR>
where
    TR: ErrorTallyRepository,
    SR: SessionRepository,
{
    pub fn new(repository: Arc<TR>, sessions: Arc<SR>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    async fn ensure_owned_session(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<(), ErrorTallyError> {
        match self.sessions.find_by_id(session_id).await? {
            Some(session) if session.is_owned_by(owner) => Ok(()),
            _ => Err(ErrorTallyError::SessionNotFound(session_id.to_string())),
        }
    }

    async fn tally_in_session(
        &self,
        session_id: &SessionId,
        id: &ErrorTallyId,
    ) -> Result<ErrorTally, ErrorTallyError> {
        match self.repository.find_by_id(id).await? {
            Some(tally) if tally.session_id == *session_id => Ok(tally),
            _ => Err(ErrorTallyError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl<TR, SR> ErrorTallyServicePort for ErrorTallyService<TR, SR>
where
    TR: ErrorTallyRepository,
    SR: SessionRepository,
{
    async fn list_tallies(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<Vec<ErrorTally>, ErrorTallyError> {
        self.ensure_owned_session(owner, session_id).await?;
        self.repository.list_by_session(session_id).await
    }

    async fn create_tally(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        command: CreateErrorTallyCommand,
    ) -> Result<ErrorTally, ErrorTallyError> {
        self.ensure_owned_session(owner, session_id).await?;

        let now = Utc::now();
        let tally = ErrorTally {
            id: ErrorTallyId::new(),
            session_id: *session_id,
            error_type: command.error_type,
            count: command.count,
            created_at: now,
            updated_at: now,
        };

        self.repository.create(tally).await
    }

    async fn update_tally(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        id: &ErrorTallyId,
        command: UpdateErrorTallyCommand,
    ) -> Result<ErrorTally, ErrorTallyError> {
        self.ensure_owned_session(owner, session_id).await?;
        let mut tally = self.tally_in_session(session_id, id).await?;

        if let Some(error_type) = command.error_type {
            tally.error_type = error_type;
        }

        if let Some(count) = command.count {
            tally.count = count;
        }

        tally.updated_at = Utc::now();

        self.repository.update(tally).await
    }

    async fn delete_tally(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        id: &ErrorTallyId,
    ) -> Result<(), ErrorTallyError> {
        self.ensure_owned_session(owner, session_id).await?;
        self.tally_in_session(session_id, id).await?;

        self.repository.delete(id).await
    }
}
