//! Background runner draining the product-import queue.
//!
//! The upload endpoint stages the CSV artifact and enqueues an
//! [`ImportProductsJob`]; this task picks jobs up one at a time and runs
//! them against the database. A failing job is logged and does not stop
//! the runner.

use std::sync::Arc;

use catalog_db::DbPool;
use catalog_importer::job::{ImportOutcome, ImportProductsJob};
use catalog_importer::pg::{PgProductSink, PgVendorDirectory};
use catalog_importer::store::ArtifactStore;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Run the import queue loop.
///
/// Drains `jobs` until `cancel` is triggered or every sender is dropped.
pub async fn run(
    pool: DbPool,
    store: Arc<ArtifactStore>,
    mut jobs: mpsc::Receiver<ImportProductsJob>,
    cancel: CancellationToken,
) {
    let vendors = PgVendorDirectory::new(pool.clone());
    let sink = PgProductSink::new(pool);

    tracing::info!(storage_root = %store.root().display(), "Import runner started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Import runner stopping");
                break;
            }
            job = jobs.recv() => {
                let Some(job) = job else {
                    tracing::info!("Import queue closed, runner stopping");
                    break;
                };

                tracing::info!(path = %job.file_path, "Import job started");
                match job.run(&store, &vendors, &sink).await {
                    Ok(ImportOutcome::Completed { inserted, skipped, artifact_removed }) => {
                        tracing::info!(
                            path = %job.file_path,
                            inserted,
                            skipped,
                            "Import job completed"
                        );
                        if !artifact_removed {
                            tracing::warn!(path = %job.file_path, "Import artifact left behind");
                        }
                    }
                    Ok(outcome) => {
                        // Terminal non-success outcomes were already
                        // logged with their cause by the job itself.
                        tracing::warn!(path = %job.file_path, ?outcome, "Import job did not complete");
                    }
                    Err(e) => {
                        tracing::error!(path = %job.file_path, error = %e, "Import job failed");
                    }
                }
            }
        }
    }
}
