use std::sync::Arc;

use diesel::{
    r2d2::{ConnectionManager, PooledConnection},
    SqliteConnection,
};

use crate::{
    config::AppConfig,
    db::SqlitePool,
    error::{AppError, AppResult},
    extract::JobExtractor,
    fetch::PageFetcher,
};

type SqlitePooledConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn JobExtractor>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: AppConfig,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn JobExtractor>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            fetcher,
            extractor,
        }
    }

    pub fn db(&self) -> AppResult<SqlitePooledConnection> {
        self.pool
            .get()
            .map_err(|err| AppError::internal(format!("database pool error: {err}")))
    }
}
