//! Vendor entity model and DTOs.

use catalog_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `vendors` table. Every vendor is owned by one user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vendor {
    pub id: EntityId,
    pub user_id: EntityId,
    pub company_name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new vendor. The owner is taken from the
/// authenticated user, not the request body.
#[derive(Debug, Deserialize)]
pub struct CreateVendor {
    pub company_name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: Option<String>,
}

/// DTO for updating an existing vendor. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateVendor {
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}
