use std::sync::Arc;

use auth::Authenticator;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::Extensions;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use thiserror::Error;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified identity of the caller, stored in request extensions.
///
/// Only [`authenticate`] inserts it, and only after the token's signature and
/// expiry have been checked for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Why a request carried no usable bearer credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BearerError {
    #[error("Authorization header is missing")]
    Missing,

    #[error("Authorization header is not valid UTF-8")]
    NotUtf8,

    #[error("Authorization scheme is not Bearer")]
    WrongScheme,

    #[error("Bearer token is empty or contains whitespace")]
    Malformed,
}

impl BearerError {
    pub fn reason(&self) -> &'static str {
        match self {
            BearerError::Missing => "missing_header",
            BearerError::NotUtf8 => "header_not_utf8",
            BearerError::WrongScheme => "wrong_scheme",
            BearerError::Malformed => "malformed_bearer",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("No authenticated identity on request; is the route behind the authentication layer?")]
    Missing,
}

/// Middleware that validates the bearer token and attaches the caller's identity.
///
/// Every rejection produces the same 401 body; the specific cause is only logged.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(req.headers()).map_err(|e| {
        tracing::warn!(reason = e.reason(), uri = %req.uri(), "Request rejected: {}", e);
        unauthorized()
    })?;

    let subject = authenticator.verify_token(token).map_err(|e| {
        tracing::warn!(reason = e.reason(), uri = %req.uri(), "Token verification failed: {}", e);
        unauthorized()
    })?;

    let user_id = UserId::from_string(&subject).map_err(|e| {
        tracing::warn!(reason = "malformed_subject", "Token subject is not a user ID: {}", e);
        unauthorized()
    })?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched exactly and the token must be a single non-empty
/// run of non-whitespace characters.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers.get(AUTHORIZATION).ok_or(BearerError::Missing)?;
    let value = value.to_str().map_err(|_| BearerError::NotUtf8)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(BearerError::WrongScheme)?;

    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(BearerError::Malformed);
    }

    Ok(token)
}

/// Read the verified subject placed on the request by [`authenticate`].
///
/// # Errors
/// * `Missing` - The route was not wired behind the authentication layer
pub fn current_subject(extensions: &Extensions) -> Result<UserId, IdentityError> {
    extensions
        .get::<AuthenticatedUser>()
        .map(|identity| identity.user_id)
        .ok_or(IdentityError::Missing)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_subject(&parts.extensions)
            .map(|user_id| AuthenticatedUser { user_id })
            .map_err(|e| {
                tracing::error!(uri = %parts.uri, "{}", e);
                ApiError::InternalServerError(e.to_string())
            })
    }
}

fn unauthorized() -> Response {
    ApiError::Unauthorized(ApiError::AUTHENTICATION_REQUIRED.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &'static [u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_accepts_single_token() {
        let headers = headers_with(b"Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejections() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(BearerError::Missing));
        assert_eq!(
            bearer_token(&headers_with(b"Bearer \xff\xfe")),
            Err(BearerError::NotUtf8)
        );
        assert_eq!(
            bearer_token(&headers_with(b"Basic dXNlcjpwYXNz")),
            Err(BearerError::WrongScheme)
        );
        assert_eq!(
            bearer_token(&headers_with(b"bearer abc")),
            Err(BearerError::WrongScheme)
        );
        assert_eq!(
            bearer_token(&headers_with(b"Bearer ")),
            Err(BearerError::Malformed)
        );
        assert_eq!(
            bearer_token(&headers_with(b"Bearer abc def")),
            Err(BearerError::Malformed)
        );
        assert_eq!(
            bearer_token(&headers_with(b"Bearer  abc")),
            Err(BearerError::Malformed)
        );
    }

    #[test]
    fn test_current_subject() {
        let mut extensions = Extensions::new();
        assert_eq!(current_subject(&extensions), Err(IdentityError::Missing));

        let user_id = UserId::new();
        extensions.insert(AuthenticatedUser { user_id });
        assert_eq!(current_subject(&extensions), Ok(user_id));
    }
}
