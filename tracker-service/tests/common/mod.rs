#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;
use tokio::sync::Mutex;
use tracker_service::domain::session::models::Session;
use tracker_service::domain::session::models::SessionId;
use tracker_service::domain::session::models::ShareToken;
use tracker_service::domain::session::ports::SessionRepository;
use tracker_service::domain::session::service::SessionService;
use tracker_service::domain::tally::models::ErrorTally;
use tracker_service::domain::tally::models::ErrorTallyId;
use tracker_service::domain::tally::ports::ErrorTallyRepository;
use tracker_service::domain::tally::service::ErrorTallyService;
use tracker_service::domain::user::models::EmailAddress;
use tracker_service::domain::user::models::PasswordResetToken;
use tracker_service::domain::user::models::User;
use tracker_service::domain::user::models::UserId;
use tracker_service::domain::user::ports::PasswordResetNotifier;
use tracker_service::domain::user::ports::PasswordResetRepository;
use tracker_service::domain::user::ports::UserRepository;
use tracker_service::domain::user::service::UserService;
use tracker_service::inbound::http::router::create_router;
use tracker_service::inbound::http::router::AppState;
use tracker_service::session::errors::SessionError;
use tracker_service::tally::errors::ErrorTallyError;
use tracker_service::user::errors::NotifierError;
use tracker_service::user::errors::UserError;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns the real router over in-memory storage
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub authenticator: Arc<Authenticator>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Minimal Argon2 cost keeps the suite fast
        let password_hasher =
            PasswordHasher::with_cost(1024, 1, 1).expect("Failed to build test hasher");
        let authenticator = Arc::new(
            Authenticator::new(TEST_JWT_SECRET).with_password_hasher(password_hasher.clone()),
        );

        let store = Arc::new(InMemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let user_service = UserService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&notifier),
            password_hasher,
        );
        let session_service = SessionService::new(Arc::clone(&store), Arc::clone(&store));
        let tally_service = ErrorTallyService::new(Arc::clone(&store), Arc::clone(&store));

        let state = AppState::new(
            Arc::new(user_service),
            Arc::new(session_service),
            Arc::new(tally_service),
            Arc::clone(&authenticator),
        );
        let router = create_router(state);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            store,
            notifier,
            authenticator,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.put(self.url(path)).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path)).bearer_auth(token)
    }

    /// Register a user and return `(token, user_id)`.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (String, String) {
        let response = self
            .post("/api/register")
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Create a session for the token's owner and return its JSON.
    pub async fn create_session(&self, token: &str, name: &str) -> Value {
        let response = self
            .post_authenticated("/api/sessions", token)
            .json(&json!({
                "name": name,
                "opponent_name": "Practice partner",
                "session_date": "2024-03-01T10:00:00Z"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        response.json().await.expect("Failed to parse response")
    }
}

/// Captures reset tokens instead of delivering them.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Last raw token sent to `email`, if any.
    pub async fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl PasswordResetNotifier for RecordingNotifier {
    async fn send_reset_token(&self, user: &User, raw_token: &str) -> Result<(), NotifierError> {
        self.sent
            .lock()
            .await
            .push((user.email.to_string(), raw_token.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    reset_tokens: HashMap<Uuid, PasswordResetToken>,
    sessions: HashMap<SessionId, Session>,
    tallies: HashMap<ErrorTallyId, ErrorTally>,
}

impl StoreState {
    fn with_error_count(&self, mut session: Session) -> Session {
        session.error_count = self
            .tallies
            .values()
            .filter(|t| t.session_id == session.id)
            .map(|t| i64::from(t.count.value()))
            .sum();
        session
    }
}

/// In-memory stand-in for the Postgres repositories.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }

    pub async fn password_hash_of(&self, email: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email.as_str() == email)
            .map(|u| u.password_hash.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        match state.users.get_mut(&user.id) {
            Some(existing) => {
                existing.name = user.name.clone();
                existing.email = user.email.clone();
                existing.updated_at = user.updated_at;
                Ok(user)
            }
            None => Err(UserError::NotFound(user.id.to_string())),
        }
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(id)
            .ok_or(UserError::NotFound(id.to_string()))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = updated_at;
        Ok(())
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryStore {
    async fn create(&self, token: PasswordResetToken) -> Result<(), UserError> {
        self.state
            .lock()
            .await
            .reset_tokens
            .insert(token.id, token);
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<PasswordResetToken>, UserError> {
        Ok(self.state.lock().await.reset_tokens.get(id).cloned())
    }

    async fn mark_used(&self, id: &Uuid, used_at: DateTime<Utc>) -> Result<bool, UserError> {
        let mut state = self.state.lock().await;
        match state.reset_tokens.get_mut(id) {
            Some(token) if token.used_at.is_none() => {
                token.used_at = Some(used_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn create(&self, session: Session) -> Result<Session, SessionError> {
        self.state
            .lock()
            .await
            .sessions
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .get(id)
            .cloned()
            .map(|s| state.with_error_count(s)))
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Session>, SessionError> {
        let state = self.state.lock().await;
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.user_id == *owner)
            .cloned()
            .map(|s| state.with_error_count(s))
            .collect();
        sessions.sort_by(|a, b| b.session_date.cmp(&a.session_date));
        Ok(sessions)
    }

    async fn update(&self, session: Session) -> Result<Session, SessionError> {
        let mut state = self.state.lock().await;
        match state.sessions.get_mut(&session.id) {
            Some(existing) => {
                existing.name = session.name.clone();
                existing.opponent_name = session.opponent_name.clone();
                existing.session_date = session.session_date;
                existing.updated_at = session.updated_at;
                Ok(session)
            }
            None => Err(SessionError::NotFound(session.id.to_string())),
        }
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        if state.sessions.remove(id).is_none() {
            return Err(SessionError::NotFound(id.to_string()));
        }
        state.tallies.retain(|_, t| t.session_id != *id);
        Ok(())
    }

    async fn set_share_token(
        &self,
        id: &SessionId,
        token: Option<ShareToken>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .get_mut(id)
            .ok_or(SessionError::NotFound(id.to_string()))?;
        session.share_token = token;
        session.updated_at = updated_at;
        Ok(())
    }

    async fn find_by_share_token(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .values()
            .find(|s| s.share_token.as_ref().map(|t| t.as_str()) == Some(token))
            .cloned()
            .map(|s| state.with_error_count(s)))
    }
}

#[async_trait]
impl ErrorTallyRepository for InMemoryStore {
    async fn create(&self, tally: ErrorTally) -> Result<ErrorTally, ErrorTallyError> {
        self.state
            .lock()
            .await
            .tallies
            .insert(tally.id, tally.clone());
        Ok(tally)
    }

    async fn find_by_id(&self, id: &ErrorTallyId) -> Result<Option<ErrorTally>, ErrorTallyError> {
        Ok(self.state.lock().await.tallies.get(id).cloned())
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ErrorTally>, ErrorTallyError> {
        let mut tallies: Vec<ErrorTally> = self
            .state
            .lock()
            .await
            .tallies
            .values()
            .filter(|t| t.session_id == *session_id)
            .cloned()
            .collect();
        tallies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tallies)
    }

    async fn update(&self, tally: ErrorTally) -> Result<ErrorTally, ErrorTallyError> {
        let mut state = self.state.lock().await;
        match state.tallies.get_mut(&tally.id) {
            Some(existing) => {
                *existing = tally.clone();
                Ok(tally)
            }
            None => Err(ErrorTallyError::NotFound(tally.id.to_string())),
        }
    }

    async fn delete(&self, id: &ErrorTallyId) -> Result<(), ErrorTallyError> {
        match self.state.lock().await.tallies.remove(id) {
            Some(_) => Ok(()),
            None => Err(ErrorTallyError::NotFound(id.to_string())),
        }
    }
}
