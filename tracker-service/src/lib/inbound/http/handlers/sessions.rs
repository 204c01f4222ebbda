use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::session::models::CreateSessionCommand;
use crate::domain::session::models::OpponentName;
use crate::domain::session::models::Session;
use crate::domain::session::models::SessionId;
use crate::domain::session::models::SessionName;
use crate::domain::session::models::UpdateSessionCommand;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::session::errors::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    pub session_date: DateTime<Utc>,
    pub share_token: Option<String>,
    pub error_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionData {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.to_string(),
            user_id: session.user_id.to_string(),
            name: session.name.as_str().to_string(),
            opponent_name: session
                .opponent_name
                .as_ref()
                .map(|o| o.as_str().to_string()),
            session_date: session.session_date,
            share_token: session.share_token.as_ref().map(|t| t.to_string()),
            error_count: session.error_count,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

pub(super) fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    SessionId::from_string(raw).map_err(|e| ApiError::from(SessionError::from(e)))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
) -> Result<ApiSuccess<Vec<SessionData>>, ApiError> {
    state
        .session_service
        .list_sessions(&identity.user_id)
        .await
        .map_err(ApiError::from)
        .map(|sessions| ApiSuccess::new(StatusCode::OK, sessions.iter().map(Into::into).collect()))
}

/// HTTP request body for creating a session (raw JSON)
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub opponent_name: Option<String>,
    pub session_date: DateTime<Utc>,
}

impl CreateSessionRequest {
    fn try_into_command(self) -> Result<CreateSessionCommand, SessionError> {
        let name = SessionName::new(self.name)?;
        let opponent_name = self
            .opponent_name
            .map(OpponentName::optional)
            .transpose()
            .map_err(SessionError::InvalidOpponentName)?
            .flatten();

        Ok(CreateSessionCommand {
            name,
            opponent_name,
            session_date: self.session_date,
        })
    }
}

pub async fn create_session(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let command = req.try_into_command()?;

    state
        .session_service
        .create_session(&identity.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

pub async fn get_session(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path(session_id): Path<String>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    state
        .session_service
        .get_session(&identity.user_id, &session_id)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

/// Partial update; an empty `opponent_name` clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub name: Option<String>,
    pub opponent_name: Option<String>,
    pub session_date: Option<DateTime<Utc>>,
}

impl UpdateSessionRequest {
    fn try_into_command(self) -> Result<UpdateSessionCommand, SessionError> {
        let name = self.name.map(SessionName::new).transpose()?;
        let opponent_name = self
            .opponent_name
            .map(OpponentName::optional)
            .transpose()
            .map_err(SessionError::InvalidOpponentName)?;

        Ok(UpdateSessionCommand {
            name,
            opponent_name,
            session_date: self.session_date,
        })
    }
}

pub async fn update_session(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path(session_id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let command = req.try_into_command()?;

    state
        .session_service
        .update_session(&identity.user_id, &session_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

pub async fn delete_session(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    state
        .session_service
        .delete_session(&identity.user_id, &session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
