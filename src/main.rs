use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use jobwatch::{
    config::AppConfig,
    db,
    extract::{JobExtractor, OpenAiExtractor},
    fetch::{HttpFetcher, PageFetcher},
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.database_url,
        pool_size = config.database_max_pool_size,
        model = %config.openai_model,
        api_key = %config.redacted_api_key(),
        "loaded configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    db::run_migrations(&pool)?;

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::from_config(&config)?);
    let extractor: Arc<dyn JobExtractor> = Arc::new(OpenAiExtractor::from_config(&config)?);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = AppState::new(pool, config, fetcher, extractor);
    let router = routes::create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "jobwatch listening");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
