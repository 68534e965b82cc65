use clinicapi::{
    app::{build_router, cors_layer, AppState},
    auth::JwtService,
    config::AppConfig,
};
use dotenvy::dotenv;
use sea_orm::Database;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinicapi=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting clinicapi in {} environment", config.environment);
    if !config.is_development() && config.cors_allowed_origins.trim() == "*" {
        warn!("wildcard CORS origin configured outside development");
    }

    info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    info!("Database connected successfully");

    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
    let state = AppState::new(db, jwt_service);
    let app = build_router(state, cors_layer(&config.cors_allowed_origins));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server starting on http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
