use std::sync::Arc;

use auth::TokenIssuer;
use auth::TokenPolicy;
use identity_service::config::Config;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::cookies::CookiePolicy;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::inbound::http::router::RouterSettings;
use identity_service::outbound::oauth::GoogleOAuthClient;
use identity_service::outbound::repositories::PostgresUserRepository;
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
        base_path = %config.server.base_path,
        environment = ?config.server.environment,
        access_ttl_minutes = config.tokens.access_ttl_minutes,
        refresh_ttl_days = config.tokens.refresh_ttl_days,
        rotate_refresh_tokens = config.tokens.rotate_refresh_tokens,
        allowed_origins = ?config.cors.allowed_origins,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_issuer = Arc::new(TokenIssuer::new(
        TokenPolicy::new(
            &config.tokens.access_secret,
            chrono::Duration::minutes(config.tokens.access_ttl_minutes),
        ),
        TokenPolicy::new(
            &config.tokens.refresh_secret,
            chrono::Duration::days(config.tokens.refresh_ttl_days),
        ),
    ));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(
        user_repository,
        Arc::clone(&token_issuer),
        config.tokens.rotate_refresh_tokens,
    ));

    let state = AppState {
        user_service,
        cookie_policy: CookiePolicy::new(config.server.environment, token_issuer.refresh_ttl()),
        token_issuer,
        oauth_provider: Arc::new(GoogleOAuthClient::new(&config.google)),
    };
    let settings = RouterSettings {
        base_path: config.server.base_path.clone(),
        allowed_origins: config.cors.allowed_origins.clone(),
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(state, &settings)).await?;

    tracing::info!("Server exited");

    Ok(())
}
