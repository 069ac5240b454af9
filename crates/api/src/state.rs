use std::sync::Arc;

use catalog_db::DbPool;
use catalog_importer::job::ImportProductsJob;
use catalog_importer::store::ArtifactStore;
use tokio::sync::mpsc;

use crate::config::ServerConfig;

/// Shared application state passed to all request handlers.
///
/// Cloning is cheap: the pool is an internal `Arc`, and the rest of the
/// fields are `Arc`s or channel handles themselves.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: DbPool,
    /// Server configuration (JWT secrets, timeouts, CORS origins).
    pub config: Arc<ServerConfig>,
    /// Local filesystem store for uploaded import artifacts.
    pub artifact_store: Arc<ArtifactStore>,
    /// Queue feeding the background import runner.
    pub import_queue: mpsc::Sender<ImportProductsJob>,
}
