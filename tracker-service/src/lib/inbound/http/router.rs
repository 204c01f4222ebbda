use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::HeaderName;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::MakeRequestUuid;
use tower_http::request_id::PropagateRequestIdLayer;
use tower_http::request_id::SetRequestIdLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_user::change_password;
use super::handlers::current_user::get_current_user;
use super::handlers::current_user::update_current_user;
use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::password_reset::forgot_password;
use super::handlers::password_reset::reset_password;
use super::handlers::register::register;
use super::handlers::sessions::create_session;
use super::handlers::sessions::delete_session;
use super::handlers::sessions::get_session;
use super::handlers::sessions::list_sessions;
use super::handlers::sessions::update_session;
use super::handlers::share::get_shared_session;
use super::handlers::share::share_session;
use super::handlers::share::unshare_session;
use super::handlers::tallies::create_tally;
use super::handlers::tallies::delete_tally;
use super::handlers::tallies::list_tallies;
use super::handlers::tallies::update_tally;
use super::middleware::authenticate;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::tally::ports::ErrorTallyServicePort;
use crate::domain::user::ports::UserServicePort;

const REQUEST_ID_HEADER: &str = "x-request-id";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CORS_MAX_AGE: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub session_service: Arc<dyn SessionServicePort>,
    pub tally_service: Arc<dyn ErrorTallyServicePort>,
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(
        user_service: Arc<dyn UserServicePort>,
        session_service: Arc<dyn SessionServicePort>,
        tally_service: Arc<dyn ErrorTallyServicePort>,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        Self {
            user_service,
            session_service,
            tally_service,
            authenticator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    create_router_with_timeout(state, DEFAULT_REQUEST_TIMEOUT)
}

pub fn create_router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/forgot-password", post(forgot_password))
        .route("/api/reset-password", post(reset_password))
        .route("/api/shared/:share_token", get(get_shared_session));

    let protected_routes = Router::new()
        .route("/api/user", get(get_current_user).put(update_current_user))
        .route("/api/user/password", put(change_password))
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route(
            "/api/sessions/:session_id",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route(
            "/api/sessions/:session_id/share",
            post(share_session).delete(unshare_session),
        )
        .route(
            "/api/sessions/:session_id/errors",
            get(list_tallies).post(create_tally),
        )
        .route(
            "/api/sessions/:session_id/errors/:error_id",
            put(update_tally).delete(delete_tally),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.authenticator),
            authenticate,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");

            // Headers are left out: Authorization carries a credential
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    request_id_header.clone(),
                    MakeRequestUuid,
                ))
                .layer(trace_layer)
                .layer(TimeoutLayer::new(request_timeout))
                .layer(PropagateRequestIdLayer::new(request_id_header))
                .layer(CorsLayer::very_permissive().max_age(CORS_MAX_AGE)),
        )
        .with_state(state)
}
