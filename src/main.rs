use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use reelrank_api::{
    config::Config,
    db::{self, Cache, JsonFilePreferences, PgHistoryStore},
    routes::{create_router, AppState},
    services::{criteria_store::CriteriaStore, providers::tmdb::TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db_pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&db_pool).await?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client);

    let provider = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let preferences = Arc::new(JsonFilePreferences::open(&config.preferences_path));
    let criteria_store = CriteriaStore::new(preferences);
    let history = Arc::new(PgHistoryStore::new(db_pool));

    let state = Arc::new(AppState::new(provider, criteria_store, history));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
