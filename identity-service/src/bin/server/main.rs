use std::sync::Arc;

use identity_service::bootstrap::ensure_default_role;
use identity_service::config::Config;
use identity_service::domain::account::service::AccountService;
use identity_service::domain::session::service::SessionService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::PostgresAccountRepository;
use identity_service::outbound::repositories::PostgresRoleRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        request_timeout_seconds = config.server.request_timeout_seconds,
        access_token_ttl_seconds = config.jwt.access_token_ttl_seconds,
        refresh_token_ttl_seconds = config.jwt.refresh_token_ttl_seconds,
        leeway_seconds = config.jwt.leeway_seconds,
        default_role = %config.accounts.default_role,
        "Configuration loaded"
    );

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

    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pg_pool));

    ensure_default_role(role_repository.as_ref(), &config.accounts.default_role).await?;

    let hasher = Arc::new(auth::PasswordHasher::new());
    let token_service = Arc::new(auth::TokenService::new(
        config.jwt.secret.as_bytes(),
        config.jwt.token_policy(),
    ));

    let account_service = Arc::new(AccountService::new(
        Arc::clone(&account_repository),
        role_repository,
        Arc::clone(&hasher),
        config.accounts.default_role.clone(),
    ));
    let session_service = Arc::new(SessionService::new(
        account_repository,
        hasher,
        token_service,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        session_service,
        account_service,
        config.server.request_timeout(),
    );
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}
