//! PostgreSQL-backed implementations of the pipeline's capability traits.

use async_trait::async_trait;
use catalog_core::import::ValidatedProduct;
use catalog_core::types::EntityId;
use catalog_db::repositories::{ProductRepo, VendorRepo};
use catalog_db::DbPool;

use crate::{ProductSink, VendorDirectory};

/// Vendor-existence checks against the `vendors` table.
#[derive(Debug, Clone)]
pub struct PgVendorDirectory {
    pool: DbPool,
}

impl PgVendorDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VendorDirectory for PgVendorDirectory {
    async fn exists(&self, id: EntityId) -> Result<bool, sqlx::Error> {
        VendorRepo::exists(&self.pool, id).await
    }
}

/// Bulk inserts into the `products` table.
#[derive(Debug, Clone)]
pub struct PgProductSink {
    pool: DbPool,
}

impl PgProductSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductSink for PgProductSink {
    async fn insert_many(&self, products: &[ValidatedProduct]) -> Result<u64, sqlx::Error> {
        ProductRepo::insert_many(&self.pool, products).await
    }
}
