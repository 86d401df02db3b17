use anyhow::Context;
use tokio::net::TcpListener;

use lemma_srs::{
    config::AppConfig,
    db::{build_pool, init_schema},
    features::jobs::JobStore,
    handlers::{router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Database configuration
    let config = AppConfig::from_env()?;
    let pool = build_pool(&config.database_url, config.pool_size)
        .with_context(|| format!("Failed to create DB pool for {}", config.database_url))?;
    {
        let mut conn = pool.get().context("Failed to check out a connection")?;
        init_schema(&mut conn).context("Failed to initialize schema")?;
    }

    let state = AppState {
        pool,
        jobs: JobStore::spawn(),
    };
    let app = router(state);

    // Start server
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    log::info!("Server running on http://{}", config.bind_address);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
