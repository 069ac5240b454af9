//! Handlers for the `/vendors` resource.
//!
//! Regular users only ever see and mutate vendors they own; the `/vendors/all`
//! listing is reserved for admins.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::types::EntityId;
use catalog_db::models::vendor::{CreateVendor, UpdateVendor, Vendor};
use catalog_db::repositories::VendorRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/vendors/all
///
/// List every vendor in the system. Admin only.
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<Vendor>>> {
    let vendors = VendorRepo::list_all(&state.pool).await?;
    Ok(Json(vendors))
}

/// GET /api/v1/vendors
///
/// List the authenticated user's vendors.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<Vendor>>> {
    let vendors = VendorRepo::list_by_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(vendors))
}

/// POST /api/v1/vendors
///
/// Register a new vendor owned by the authenticated user. Returns 201.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateVendor>,
) -> AppResult<(StatusCode, Json<Vendor>)> {
    validate_create(&input)?;

    let vendor = VendorRepo::create(&state.pool, auth_user.user_id, &input).await?;
    tracing::info!(vendor_id = %vendor.id, user_id = %auth_user.user_id, "vendor created");

    Ok((StatusCode::CREATED, Json(vendor)))
}

/// GET /api/v1/vendors/{id}
///
/// Fetch one of the authenticated user's vendors. A vendor owned by
/// someone else is indistinguishable from a missing one (404).
pub async fn get(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<Vendor>> {
    let vendor = VendorRepo::find_for_user(&state.pool, id, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "vendor",
            id,
        }))?;
    Ok(Json(vendor))
}

/// PUT /api/v1/vendors/{id}
///
/// Partially update one of the authenticated user's vendors.
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateVendor>,
) -> AppResult<Json<Vendor>> {
    if let Some(email) = &input.email {
        if !email.contains('@') {
            return Err(AppError::Core(CoreError::Validation(
                "A valid email address is required".into(),
            )));
        }
    }
    if matches!(&input.company_name, Some(name) if name.trim().is_empty() || name.chars().count() > 255)
    {
        return Err(AppError::Core(CoreError::Validation(
            "Company name must be non-empty and at most 255 characters".into(),
        )));
    }

    let vendor = VendorRepo::update_for_user(&state.pool, id, auth_user.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "vendor",
            id,
        }))?;
    Ok(Json(vendor))
}

/// DELETE /api/v1/vendors/{id}
///
/// Delete one of the authenticated user's vendors. Products under the
/// vendor are removed by the FK cascade. Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    let deleted = VendorRepo::delete_for_user(&state.pool, id, auth_user.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "vendor",
            id,
        }));
    }
    tracing::info!(vendor_id = %id, user_id = %auth_user.user_id, "vendor deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Length limits count characters, not bytes, to match the CSV validator.
fn validate_create(input: &CreateVendor) -> AppResult<()> {
    if input.company_name.trim().is_empty() || input.company_name.chars().count() > 255 {
        return Err(AppError::Core(CoreError::Validation(
            "Company name must be non-empty and at most 255 characters".into(),
        )));
    }
    if input.contact_person.trim().is_empty() || input.contact_person.chars().count() > 255 {
        return Err(AppError::Core(CoreError::Validation(
            "Contact person must be non-empty and at most 255 characters".into(),
        )));
    }
    if input.phone.chars().count() > 20 {
        return Err(AppError::Core(CoreError::Validation(
            "Phone number must be at most 20 characters".into(),
        )));
    }
    if !input.email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }
    Ok(())
}
