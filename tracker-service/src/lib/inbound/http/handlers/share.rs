use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::sessions::parse_session_id;
use super::tallies::ErrorTallyData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareData {
    pub share_token: String,
}

pub async fn share_session(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path(session_id): Path<String>,
) -> Result<ApiSuccess<ShareData>, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    let token = state
        .session_service
        .share_session(&identity.user_id, &session_id)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ShareData {
            share_token: token.to_string(),
        },
    ))
}

pub async fn unshare_session(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    state
        .session_service
        .unshare_session(&identity.user_id, &session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Session as shown to anonymous readers of a share link. Leaves out the
/// owner and the share token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicSessionData {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    pub session_date: DateTime<Utc>,
    pub error_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for PublicSessionData {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.to_string(),
            name: session.name.as_str().to_string(),
            opponent_name: session
                .opponent_name
                .as_ref()
                .map(|o| o.as_str().to_string()),
            session_date: session.session_date,
            error_count: session.error_count,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedSessionData {
    pub session: PublicSessionData,
    pub errors: Vec<ErrorTallyData>,
}

/// Public read of a shared session; no identity required.
pub async fn get_shared_session(
    State(state): State<AppState>,
    Path(share_token): Path<String>,
) -> Result<ApiSuccess<SharedSessionData>, ApiError> {
    let shared = state
        .session_service
        .get_shared_session(&share_token)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SharedSessionData {
            session: (&shared.session).into(),
            errors: shared.errors.iter().map(Into::into).collect(),
        },
    ))
}
