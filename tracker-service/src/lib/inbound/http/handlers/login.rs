use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::current_user::UserData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponseData {
    pub token: String,
    pub user: UserData,
}

impl AuthResponseData {
    /// Issue a fresh identity token for `user`.
    pub fn issue(state: &AppState, user: &User) -> Result<Self, ApiError> {
        let token = state.authenticator.issue_token(user.id)?;

        Ok(Self {
            token,
            user: user.into(),
        })
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    // A malformed address can't belong to anyone; answer like any unknown email
    let email =
        EmailAddress::new(body.email).map_err(|_| ApiError::from(UserError::InvalidCredentials))?;

    let user = state
        .user_service
        .verify_credentials(&email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    AuthResponseData::issue(&state, &user).map(|data| ApiSuccess::new(StatusCode::OK, data))
}
