use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracker_service::config::Config;
use tracker_service::domain::session::service::SessionService;
use tracker_service::domain::tally::service::ErrorTallyService;
use tracker_service::domain::user::service::UserService;
use tracker_service::inbound::http::router::create_router_with_timeout;
use tracker_service::inbound::http::router::AppState;
use tracker_service::outbound::notifications::LoggingResetNotifier;
use tracker_service::outbound::repositories::PostgresErrorTallyRepository;
use tracker_service::outbound::repositories::PostgresPasswordResetRepository;
use tracker_service::outbound::repositories::PostgresSessionRepository;
use tracker_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "tracker-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        jwt = ?config.jwt,
        "Configuration loaded"
    );

    let jwt_secret = config.jwt.signing_secret()?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::with_cost(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;

    let authenticator = Arc::new(
        Authenticator::new(jwt_secret.as_bytes())
            .with_issuer(config.jwt.issuer.clone())
            .with_token_lifetime(chrono::Duration::hours(config.jwt.expiration_hours))
            .with_password_hasher(password_hasher),
    );

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let reset_repository = Arc::new(PostgresPasswordResetRepository::new(pg_pool.clone()));
    let session_repository = Arc::new(PostgresSessionRepository::new(pg_pool.clone()));
    let tally_repository = Arc::new(PostgresErrorTallyRepository::new(pg_pool));

    let user_service = UserService::new(
        user_repository,
        reset_repository,
        Arc::new(LoggingResetNotifier::new()),
        authenticator.password_hasher().clone(),
    )
    .with_reset_token_ttl(chrono::Duration::minutes(
        config.password.reset_token_ttl_minutes,
    ));
    let session_service =
        SessionService::new(Arc::clone(&session_repository), Arc::clone(&tally_repository));
    let tally_service = ErrorTallyService::new(tally_repository, session_repository);

    let state = AppState::new(
        Arc::new(user_service),
        Arc::new(session_service),
        Arc::new(tally_service),
        authenticator,
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router_with_timeout(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
