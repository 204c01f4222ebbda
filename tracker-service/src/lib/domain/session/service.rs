use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::session::models::CreateSessionCommand;
use crate::domain::session::models::Session;
use crate::domain::session::models::SessionId;
use crate::domain::session::models::ShareToken;
use crate::domain::session::models::SharedSession;
use crate::domain::session::models::UpdateSessionCommand;
use crate::domain::tally::ports::ErrorTallyRepository;
use crate::domain::user::models::UserId;
use crate::session::errors::SessionError;
use crate::session::ports::SessionRepository;
use crate::session::ports::SessionServicePort;

/// Domain service for sessions, scoped to the requesting owner.
pub struct SessionService<SR, TR>
where
    SR: SessionRepository,
    TR: ErrorTallyRepository,
{
    repository: Arc<SR>,
    tallies: Arc<TR>,
}

impl<SR, TR> SessionService<SR, TR>
where
    SR: SessionRepository,
    TR: ErrorTallyRepository,
{
    pub fn new(repository: Arc<SR>, tallies: Arc<TR>) -> Self {
        Self {
            repository,
            tallies,
        }
    }

    async fn owned_session(&self, owner: &UserId, id: &SessionId) -> Result<Session, SessionError> {
        match self.repository.find_by_id(id).await? {
            Some(session) if session.is_owned_by(owner) => Ok(session),
            Some(_) => {
                tracing::debug!(session_id = %id, user_id = %owner, "Session belongs to another user");
                Err(SessionError::NotFound(id.to_string()))
            }
            None => Err(SessionError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl<SR, TR> SessionServicePort for SessionService<SR, TR>
where
    SR: SessionRepository,
    TR: ErrorTallyRepository,
{
    async fn list_sessions(&self, owner: &UserId) -> Result<Vec<Session>, SessionError> {
        self.repository.list_by_owner(owner).await
    }

    async fn create_session(
        &self,
        owner: &UserId,
        command: CreateSessionCommand,
    ) -> Result<Session, SessionError> {
        let now = Utc::now();
        let session = Session {
            id: SessionId::new(),
            user_id: *owner,
            name: command.name,
            opponent_name: command.opponent_name,
            session_date: command.session_date,
            share_token: None,
            error_count: 0,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(session).await?;
        tracing::info!(session_id = %created.id, user_id = %owner, "Session created");

        Ok(created)
    }

    async fn get_session(&self, owner: &UserId, id: &SessionId) -> Result<Session, SessionError> {
        self.owned_session(owner, id).await
    }

    async fn update_session(
        &self,
        owner: &UserId,
        id: &SessionId,
        command: UpdateSessionCommand,
    ) -> Result<Session, SessionError> {
        let mut session = self.owned_session(owner, id).await?;

        if let Some(name) = command.name {
            session.name = name;
        }

        if let Some(opponent_name) = command.opponent_name {
            session.opponent_name = opponent_name;
        }

        if let Some(session_date) = command.session_date {
            session.session_date = session_date;
        }

        session.updated_at = Utc::now();

        self.repository.update(session).await
    }

    async fn delete_session(&self, owner: &UserId, id: &SessionId) -> Result<(), SessionError> {
        self.owned_session(owner, id).await?;
        self.repository.delete(id).await?;

        tracing::info!(session_id = %id, user_id = %owner, "Session deleted");
        Ok(())
    }

    async fn share_session(
        &self,
        owner: &UserId,
        id: &SessionId,
    ) -> Result<ShareToken, SessionError> {
        let session = self.owned_session(owner, id).await?;

        if let Some(existing) = session.share_token {
            return Ok(existing);
        }

        let token = ShareToken::generate();
        self.repository
            .set_share_token(id, Some(token.clone()), Utc::now())
            .await?;

        tracing::info!(session_id = %id, "Session shared");
        Ok(token)
    }

    async fn unshare_session(&self, owner: &UserId, id: &SessionId) -> Result<(), SessionError> {
        let session = self.owned_session(owner, id).await?;

        if session.share_token.is_some() {
            self.repository.set_share_token(id, None, Utc::now()).await?;
            tracing::info!(session_id = %id, "Session unshared");
        }

        Ok(())
    }

    async fn get_shared_session(&self, token: &str) -> Result<SharedSession, SessionError> {
        let session = self
            .repository
            .find_by_share_token(token)
            .await?
            .ok_or(SessionError::SharedNotFound)?;

        let errors = self.tallies.list_by_session(&session.id).await?;

        Ok(SharedSession { session, errors })
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use mockall::mock;

    use super::*;
    use crate::domain::session::models::SessionName;
    use crate::domain::tally::models::ErrorCount;
    use crate::domain::tally::models::ErrorTally;
    use crate::domain::tally::models::ErrorTallyId;
    use crate::domain::tally::models::ErrorType;
    use crate::tally::errors::ErrorTallyError;

    mock! {
        pub TestSessionRepository {}

        #[async_trait]
        impl SessionRepository for TestSessionRepository {
            async fn create(&self, session: Session) -> Result<Session, SessionError>;
            async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, SessionError>;
            async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Session>, SessionError>;
            async fn update(&self, session: Session) -> Result<Session, SessionError>;
            async fn delete(&self, id: &SessionId) -> Result<(), SessionError>;
            async fn set_share_token(&self, id: &SessionId, token: Option<ShareToken>, updated_at: DateTime<Utc>) -> Result<(), SessionError>;
            async fn find_by_share_token(&self, token: &str) -> Result<Option<Session>, SessionError>;
        }
    }

    mock! {
        pub TestTallyRepository {}

        #[async_trait]
        impl ErrorTallyRepository for TestTallyRepository {
            async fn create(&self, tally: ErrorTally) -> Result<ErrorTally, ErrorTallyError>;
            async fn find_by_id(&self, id: &ErrorTallyId) -> Result<Option<ErrorTally>, ErrorTallyError>;
            async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<ErrorTally>, ErrorTallyError>;
            async fn update(&self, tally: ErrorTally) -> Result<ErrorTally, ErrorTallyError>;
            async fn delete(&self, id: &ErrorTallyId) -> Result<(), ErrorTallyError>;
        }
    }

    fn session_owned_by(owner: UserId) -> Session {
        let now = Utc::now();
        Session {
            id: SessionId::new(),
            user_id: owner,
            name: SessionName::new("Baseline rally".to_string()).unwrap(),
            opponent_name: None,
            session_date: now,
            share_token: None,
            error_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_session_assigns_owner() {
        let mut repository = MockTestSessionRepository::new();
        let owner = UserId::new();

        repository
            .expect_create()
            .withf(move |session| {
                session.user_id == owner
                    && session.error_count == 0
                    && session.share_token.is_none()
            })
            .times(1)
            .returning(|session| Ok(session));

        let service = SessionService::new(
            Arc::new(repository),
            Arc::new(MockTestTallyRepository::new()),
        );

        let command = CreateSessionCommand {
            name: SessionName::new("Serve practice".to_string()).unwrap(),
            opponent_name: None,
            session_date: Utc::now(),
        };

        let session = service.create_session(&owner, command).await.unwrap();
        assert_eq!(session.name.as_str(), "Serve practice");
    }

    #[tokio::test]
    async fn test_foreign_session_is_not_found() {
        let mut repository = MockTestSessionRepository::new();
        let session = session_owned_by(UserId::new());
        let session_id = session.id;

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(session.clone())));
        repository.expect_delete().times(0);
        repository.expect_update().times(0);

        let service = SessionService::new(
            Arc::new(repository),
            Arc::new(MockTestTallyRepository::new()),
        );

        let intruder = UserId::new();
        assert!(matches!(
            service.get_session(&intruder, &session_id).await,
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_session(&intruder, &session_id).await,
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(
            service
                .update_session(&intruder, &session_id, UpdateSessionCommand::default())
                .await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_session_can_clear_opponent() {
        let mut repository = MockTestSessionRepository::new();
        let owner = UserId::new();
        let mut session = session_owned_by(owner);
        session.opponent_name =
            Some(crate::domain::session::models::OpponentName::new("Coach".to_string()).unwrap());
        let session_id = session.id;

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(session.clone())));
        repository
            .expect_update()
            .withf(|session| {
                session.opponent_name.is_none() && session.name.as_str() == "Baseline rally"
            })
            .times(1)
            .returning(|session| Ok(session));

        let service = SessionService::new(
            Arc::new(repository),
            Arc::new(MockTestTallyRepository::new()),
        );

        let command = UpdateSessionCommand {
            opponent_name: Some(None),
            ..Default::default()
        };
        let updated = service
            .update_session(&owner, &session_id, command)
            .await
            .unwrap();
        assert!(updated.opponent_name.is_none());
    }

    #[tokio::test]
    async fn test_share_session_reuses_existing_token() {
        let mut repository = MockTestSessionRepository::new();
        let owner = UserId::new();
        let mut session = session_owned_by(owner);
        session.share_token = Some(ShareToken::from_stored("already-shared".to_string()));
        let session_id = session.id;

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(session.clone())));
        repository.expect_set_share_token().times(0);

        let service = SessionService::new(
            Arc::new(repository),
            Arc::new(MockTestTallyRepository::new()),
        );

        let token = service.share_session(&owner, &session_id).await.unwrap();
        assert_eq!(token.as_str(), "already-shared");
    }

    #[tokio::test]
    async fn test_share_session_generates_token() {
        let mut repository = MockTestSessionRepository::new();
        let owner = UserId::new();
        let session = session_owned_by(owner);
        let session_id = session.id;

        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(session.clone())));
        repository
            .expect_set_share_token()
            .withf(move |id, token, _| *id == session_id && token.is_some())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = SessionService::new(
            Arc::new(repository),
            Arc::new(MockTestTallyRepository::new()),
        );

        let token = service.share_session(&owner, &session_id).await.unwrap();
        assert!(!token.as_str().is_empty());
    }

    #[tokio::test]
    async fn test_get_shared_session_includes_tallies() {
        let mut repository = MockTestSessionRepository::new();
        let mut tallies = MockTestTallyRepository::new();
        let mut session = session_owned_by(UserId::new());
        session.share_token = Some(ShareToken::from_stored("public".to_string()));
        session.error_count = 3;
        let session_id = session.id;

        repository
            .expect_find_by_share_token()
            .withf(|token| token == "public")
            .times(1)
            .returning(move |_| Ok(Some(session.clone())));
        tallies
            .expect_list_by_session()
            .withf(move |id| *id == session_id)
            .times(1)
            .returning(move |id| {
                let now = Utc::now();
                Ok(vec![ErrorTally {
                    id: ErrorTallyId::new(),
                    session_id: *id,
                    error_type: ErrorType::new("backhand long".to_string()).unwrap(),
                    count: ErrorCount::new(3).unwrap(),
                    created_at: now,
                    updated_at: now,
                }])
            });

        let service = SessionService::new(Arc::new(repository), Arc::new(tallies));

        let shared = service.get_shared_session("public").await.unwrap();
        assert_eq!(shared.session.error_count, 3);
        assert_eq!(shared.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_get_shared_session_unknown_token() {
        let mut repository = MockTestSessionRepository::new();
        repository
            .expect_find_by_share_token()
            .returning(|_| Ok(None));

        let service = SessionService::new(
            Arc::new(repository),
            Arc::new(MockTestTallyRepository::new()),
        );

        assert!(matches!(
            service.get_shared_session("nope").await,
            Err(SessionError::SharedNotFound)
        ));
    }
}
