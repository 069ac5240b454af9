//! Repository for the `vendors` table.

use catalog_core::types::EntityId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vendor::{CreateVendor, UpdateVendor, Vendor};

const COLUMNS: &str =
    "id, user_id, company_name, contact_person, phone, email, address, created_at, updated_at";

/// Provides CRUD operations for vendors, scoped to the owning user where
/// the route contract requires it.
pub struct VendorRepo;

impl VendorRepo {
    /// Insert a new vendor owned by `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: EntityId,
        input: &CreateVendor,
    ) -> Result<Vendor, sqlx::Error> {
        let query = format!(
            "INSERT INTO vendors (id, user_id, company_name, contact_person, phone, email, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&input.company_name)
            .bind(&input.contact_person)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.address)
            .fetch_one(pool)
            .await
    }

    /// List every vendor in the system (admin listing).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Vendor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors ORDER BY created_at DESC");
        sqlx::query_as::<_, Vendor>(&query).fetch_all(pool).await
    }

    /// List vendors owned by a user.
    pub async fn list_by_user(pool: &PgPool, user_id: EntityId) -> Result<Vec<Vendor>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM vendors WHERE user_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Vendor>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find a vendor by id, restricted to the owning user.
    pub async fn find_for_user(
        pool: &PgPool,
        id: EntityId,
        user_id: EntityId,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Referential check used by product validation: does a vendor with
    /// this id exist?
    pub async fn exists(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vendors WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update a vendor owned by `user_id`. Only non-`None` fields in
    /// `input` are applied. Returns `None` if no matching row exists.
    pub async fn update_for_user(
        pool: &PgPool,
        id: EntityId,
        user_id: EntityId,
        input: &UpdateVendor,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!(
            "UPDATE vendors SET
                company_name = COALESCE($3, company_name),
                contact_person = COALESCE($4, contact_person),
                phone = COALESCE($5, phone),
                email = COALESCE($6, email),
                address = COALESCE($7, address),
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.company_name)
            .bind(&input.contact_person)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.address)
            .fetch_optional(pool)
            .await
    }

    /// Delete a vendor owned by `user_id`. Returns `true` if a row was
    /// removed.
    pub async fn delete_for_user(
        pool: &PgPool,
        id: EntityId,
        user_id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
