//! Repository for the `products` table, including the bulk insert used
//! by the CSV import pipeline.

use catalog_core::import::ValidatedProduct;
use catalog_core::types::EntityId;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::product::{CreateProduct, Product, ProductWithVendor, UpdateProduct};

const COLUMNS: &str =
    "id, vendor_id, name, description, price, stock, created_at, updated_at";

/// Columns selected when joining products with their vendor.
const JOINED_COLUMNS: &str = "p.id, p.vendor_id, p.name, p.description, p.price, p.stock, \
                              p.created_at, p.updated_at, v.company_name AS vendor_company_name";

/// Provides CRUD and bulk-insert operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product with a freshly generated id, returning the
    /// created row.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (id, vendor_id, name, description, price, stock)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(Uuid::new_v4())
            .bind(input.vendor_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.stock)
            .fetch_one(pool)
            .await
    }

    /// Insert a batch of validated import records in a single statement.
    ///
    /// The import pipeline caps batches at
    /// [`catalog_core::import::IMPORT_BATCH_SIZE`], well inside
    /// PostgreSQL's bind-parameter limit at 8 parameters per row.
    /// Returns the number of rows inserted; an empty batch is a no-op.
    pub async fn insert_many(
        pool: &PgPool,
        products: &[ValidatedProduct],
    ) -> Result<u64, sqlx::Error> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO products (id, vendor_id, name, description, price, stock, created_at, updated_at) ",
        );
        builder.push_values(products, |mut row, product| {
            row.push_bind(product.id)
                .push_bind(product.vendor_id)
                .push_bind(&product.name)
                .push_bind(&product.description)
                .push_bind(product.price)
                .push_bind(product.stock)
                .push_bind(product.created_at)
                .push_bind(product.updated_at);
        });

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// List all products with their vendor's display name, newest first.
    pub async fn list_with_vendor(pool: &PgPool) -> Result<Vec<ProductWithVendor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM products p
             JOIN vendors v ON v.id = p.vendor_id
             ORDER BY p.created_at DESC"
        );
        sqlx::query_as::<_, ProductWithVendor>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a product by id, with its vendor's display name.
    pub async fn find_with_vendor(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<ProductWithVendor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM products p
             JOIN vendors v ON v.id = p.vendor_id
             WHERE p.id = $1"
        );
        sqlx::query_as::<_, ProductWithVendor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count all products. Used by import tests and dashboards.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(pool)
            .await
    }

    /// Update a product. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.stock)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
