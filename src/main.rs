use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use elevate_api::config::Config;
use elevate_api::db::{self, PgStore};
use elevate_api::routes::{create_router, AppState};
use elevate_api::services::{EngineConfig, RecommendationEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    let engine = RecommendationEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        EngineConfig::from(&config),
    );

    let state = Arc::new(AppState {
        engine: Arc::new(engine),
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
