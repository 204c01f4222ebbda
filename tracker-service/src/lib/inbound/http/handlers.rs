use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::session::errors::SessionError;
use crate::tally::errors::ErrorTallyError;
use crate::user::errors::UserError;

pub mod current_user;
pub mod health;
pub mod login;
pub mod password_reset;
pub mod register;
pub mod sessions;
pub mod share;
pub mod tallies;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
}

impl ApiError {
    /// Body of every rejection issued by the authentication layer.
    pub const AUTHENTICATION_REQUIRED: &'static str = "Authentication required";
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(cause) => {
                tracing::error!(error = %cause, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiErrorBody { error: message })).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            UserError::EmailAlreadyExists(_) => {
                ApiError::Conflict("Email already registered".to_string())
            }
            UserError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            UserError::InvalidResetToken => ApiError::BadRequest(err.to_string()),
            UserError::InvalidName(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidUserId(_) => ApiError::UnprocessableEntity(err.to_string()),
            UserError::Password(_) | UserError::DatabaseError(_) | UserError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) | SessionError::SharedNotFound => {
                ApiError::NotFound("Session not found".to_string())
            }
            SessionError::InvalidSessionId(_) => {
                ApiError::BadRequest("Invalid session ID".to_string())
            }
            SessionError::InvalidName(_) | SessionError::InvalidOpponentName(_) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            SessionError::DatabaseError(_) | SessionError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<ErrorTallyError> for ApiError {
    fn from(err: ErrorTallyError) -> Self {
        match err {
            ErrorTallyError::SessionNotFound(_) => {
                ApiError::NotFound("Session not found".to_string())
            }
            ErrorTallyError::NotFound(_) => ApiError::NotFound("Error not found".to_string()),
            ErrorTallyError::InvalidErrorTallyId(_) => {
                ApiError::BadRequest("Invalid error ID".to_string())
            }
            ErrorTallyError::InvalidErrorType(_) | ErrorTallyError::InvalidCount(_) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            ErrorTallyError::DatabaseError(_) | ErrorTallyError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<auth::JwtError> for ApiError {
    fn from(err: auth::JwtError) -> Self {
        ApiError::InternalServerError(format!("Token issuance failed: {}", err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Plain `{"message": ...}` acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
