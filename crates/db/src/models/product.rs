//! Product entity model and DTOs.

use catalog_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: EntityId,
    pub vendor_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A product joined with its owning vendor's display name, for list and
/// detail responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductWithVendor {
    pub id: EntityId,
    pub vendor_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub vendor_company_name: String,
}

/// DTO for creating a new product.
#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub vendor_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
}

/// DTO for updating an existing product. All fields are optional;
/// `vendor_id` is immutable after creation.
#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
}
