use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageResponse;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    email: String,
}

/// Start a reset. The response is identical whether or not the account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    if body.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    match EmailAddress::new(body.email) {
        Ok(email) => state.user_service.request_password_reset(&email).await?,
        Err(e) => tracing::debug!(error = %e, "Password reset requested for malformed email"),
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponse::new(FORGOT_PASSWORD_MESSAGE),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    token: String,
    password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    if body.token.trim().is_empty() {
        return Err(ApiError::from(UserError::InvalidResetToken));
    }

    let password = Password::new(body.password).map_err(UserError::from)?;

    state
        .user_service
        .reset_password(&body.token, password)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponse::new("Password has been reset successfully"),
    ))
}
