//! Session entity model and DTOs (refresh-token backed).

use catalog_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

/// A row from the `sessions` table. A session is live while
/// `revoked_at` is NULL and `expires_at` is in the future.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: EntityId,
    pub user_id: EntityId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: EntityId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
