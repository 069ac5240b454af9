//! Asynchronous CSV product import pipeline.
//!
//! The pipeline is an explicit orchestration job ([`job::ImportProductsJob`])
//! driven by any task runtime. Its two storage collaborators are injected
//! as capability traits so the whole pipeline can be exercised against
//! in-memory fakes:
//!
//! - [`VendorDirectory`] -- referential check for vendor identifiers
//! - [`ProductSink`] -- bulk insert of validated records
//!
//! PostgreSQL-backed implementations live in [`pg`]; the input artifact
//! lives in an [`store::ArtifactStore`] rooted at the storage directory.

use async_trait::async_trait;
use catalog_core::import::ValidatedProduct;
use catalog_core::types::EntityId;

pub mod batch;
pub mod job;
pub mod pg;
pub mod store;

/// Referential check against the vendor store.
#[async_trait]
pub trait VendorDirectory: Send + Sync {
    /// Does a vendor with this id exist?
    async fn exists(&self, id: EntityId) -> Result<bool, sqlx::Error>;
}

/// Bulk-insert primitive against the product store.
///
/// Each call must be a single bulk write; the pipeline never falls back
/// to row-by-row inserts.
#[async_trait]
pub trait ProductSink: Send + Sync {
    /// Insert the batch, returning the number of rows written.
    async fn insert_many(&self, products: &[ValidatedProduct]) -> Result<u64, sqlx::Error>;
}
