use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::sessions::parse_session_id;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::tally::models::CreateErrorTallyCommand;
use crate::domain::tally::models::ErrorCount;
use crate::domain::tally::models::ErrorTally;
use crate::domain::tally::models::ErrorTallyId;
use crate::domain::tally::models::ErrorType;
use crate::domain::tally::models::UpdateErrorTallyCommand;
use crate::domain::tally::ports::ErrorTallyServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::tally::errors::ErrorTallyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorTallyData {
    pub id: String,
    pub session_id: String,
    pub error_type: String,
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ErrorTally> for ErrorTallyData {
    fn from(tally: &ErrorTally) -> Self {
        Self {
            id: tally.id.to_string(),
            session_id: tally.session_id.to_string(),
            error_type: tally.error_type.as_str().to_string(),
            count: tally.count.value(),
            created_at: tally.created_at,
            updated_at: tally.updated_at,
        }
    }
}

fn parse_tally_id(raw: &str) -> Result<ErrorTallyId, ApiError> {
    ErrorTallyId::from_string(raw).map_err(|e| ApiError::from(ErrorTallyError::from(e)))
}

pub async fn list_tallies(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path(session_id): Path<String>,
) -> Result<ApiSuccess<Vec<ErrorTallyData>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    state
        .tally_service
        .list_tallies(&identity.user_id, &session_id)
        .await
        .map_err(ApiError::from)
        .map(|tallies| ApiSuccess::new(StatusCode::OK, tallies.iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreateErrorTallyRequest {
    pub error_type: String,
    pub count: Option<i64>,
}

impl CreateErrorTallyRequest {
    fn try_into_command(self) -> Result<CreateErrorTallyCommand, ErrorTallyError> {
        Ok(CreateErrorTallyCommand {
            error_type: ErrorType::new(self.error_type)?,
            count: self
                .count
                .map(ErrorCount::new)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

pub async fn create_tally(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path(session_id): Path<String>,
    Json(req): Json<CreateErrorTallyRequest>,
) -> Result<ApiSuccess<ErrorTallyData>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let command = req.try_into_command()?;

    state
        .tally_service
        .create_tally(&identity.user_id, &session_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref tally| ApiSuccess::new(StatusCode::CREATED, tally.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateErrorTallyRequest {
    pub error_type: Option<String>,
    pub count: Option<i64>,
}

impl UpdateErrorTallyRequest {
    fn try_into_command(self) -> Result<UpdateErrorTallyCommand, ErrorTallyError> {
        Ok(UpdateErrorTallyCommand {
            error_type: self.error_type.map(ErrorType::new).transpose()?,
            count: self.count.map(ErrorCount::new).transpose()?,
        })
    }
}

pub async fn update_tally(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path((session_id, error_id)): Path<(String, String)>,
    Json(req): Json<UpdateErrorTallyRequest>,
) -> Result<ApiSuccess<ErrorTallyData>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let error_id = parse_tally_id(&error_id)?;
    let command = req.try_into_command()?;

    state
        .tally_service
        .update_tally(&identity.user_id, &session_id, &error_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref tally| ApiSuccess::new(StatusCode::OK, tally.into()))
}

pub async fn delete_tally(
    State(state): State<AppState>,
    identity: AuthenticatedUser,
    Path((session_id, error_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let error_id = parse_tally_id(&error_id)?;

    state
        .tally_service
        .delete_tally(&identity.user_id, &session_id, &error_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
