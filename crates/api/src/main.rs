use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_api::config::ServerConfig;
use catalog_api::router::build_app_router;
use catalog_api::{background, state};
use catalog_importer::store::ArtifactStore;

use state::AppState;

/// Capacity of the in-process import job queue. Uploads beyond this
/// backlog wait in the handler until the runner catches up.
const IMPORT_QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = catalog_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    catalog_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    catalog_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Artifact store ---
    let artifact_store = Arc::new(ArtifactStore::from_env());
    tracing::info!(storage_root = %artifact_store.root().display(), "Artifact store ready");

    // --- Import runner ---
    let (import_tx, import_rx) = mpsc::channel(IMPORT_QUEUE_CAPACITY);
    let import_cancel = tokio_util::sync::CancellationToken::new();
    let mut import_handle = tokio::spawn(background::import_runner::run(
        pool.clone(),
        Arc::clone(&artifact_store),
        import_rx,
        import_cancel.clone(),
    ));
    tracing::info!("Import runner started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        artifact_store,
        import_queue: import_tx,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and with it the queue sender) was dropped when the
    // server stopped, so the runner drains any queued jobs and exits on
    // its own. Cancel only if it overruns the shutdown timeout.
    let drain = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        &mut import_handle,
    )
    .await;
    if drain.is_err() {
        tracing::warn!("Import runner did not drain in time, cancelling");
        import_cancel.cancel();
        let _ = import_handle.await;
    }
    tracing::info!("Import runner stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
