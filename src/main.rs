use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use drivebook::config::AppConfig;
use drivebook::db;
use drivebook::handlers;
use drivebook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.admin_password.is_empty() {
        tracing::warn!("ADMIN_PASSWORD is not set, admin login is disabled");
    }

    tracing::info!(
        start = %config.catalog_start,
        weeks = config.catalog_weeks,
        enforce_capacity = config.booking_policy.enforce_capacity,
        reject_unknown_slot = config.booking_policy.reject_unknown_slot,
        "seeding lesson catalog"
    );

    let state = Arc::new(AppState::new(conn, config.clone()));
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
