//! Handlers for the `/products` resource, including the CSV bulk-import
//! upload endpoint.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::import::MAX_NAME_LENGTH;
use catalog_core::types::EntityId;
use catalog_db::models::product::{CreateProduct, Product, ProductWithVendor, UpdateProduct};
use catalog_db::repositories::{ProductRepo, VendorRepo};
use catalog_importer::job::ImportProductsJob;
use catalog_importer::store::IMPORTS_DIR;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Multipart field name carrying the uploaded CSV file.
const UPLOAD_FIELD: &str = "file";

/// Response body for `POST /products/import-csv`.
#[derive(Debug, Serialize)]
pub struct ImportDispatchResponse {
    pub message: String,
    /// Relative artifact path the job will read from.
    pub file_path: String,
}

/// GET /api/v1/products
///
/// List all products with their vendor's display name, newest first.
pub async fn list(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<Vec<ProductWithVendor>>> {
    let products = ProductRepo::list_with_vendor(&state.pool).await?;
    Ok(Json(products))
}

/// POST /api/v1/products
///
/// Create a single product. The vendor reference must exist. Returns 201.
pub async fn create(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    validate_product_fields(&input.name, input.price, input.stock)?;

    if !VendorRepo::exists(&state.pool, input.vendor_id).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Vendor {} does not exist",
            input.vendor_id
        ))));
    }

    let product = ProductRepo::create(&state.pool, &input).await?;
    tracing::info!(product_id = %product.id, vendor_id = %product.vendor_id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/v1/products/{id}
pub async fn get(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<ProductWithVendor>> {
    let product = ProductRepo::find_with_vendor(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "product",
            id,
        }))?;
    Ok(Json(product))
}

/// PUT /api/v1/products/{id}
///
/// Partially update a product. `vendor_id` is immutable.
pub async fn update(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<Product>> {
    if let Some(name) = &input.name {
        if name.trim().is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Name must be non-empty and at most {MAX_NAME_LENGTH} characters"
            ))));
        }
    }
    if let Some(price) = input.price {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::Core(CoreError::Validation(
                "Price must be a non-negative number".into(),
            )));
        }
    }
    if let Some(stock) = input.stock {
        if stock < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Stock must be a non-negative integer".into(),
            )));
        }
    }

    let product = ProductRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "product",
            id,
        }))?;
    Ok(Json(product))
}

/// DELETE /api/v1/products/{id}
///
/// Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    let deleted = ProductRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "product",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/products/import-csv
///
/// Accept a multipart CSV upload, stage it in the artifact store, and
/// dispatch an import job to the background runner. Responds immediately;
/// the import itself runs asynchronously.
pub async fn import_csv(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ImportDispatchResponse>> {
    // Find the `file` field; other fields are ignored.
    let mut contents: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
            contents = Some(bytes.to_vec());
            break;
        }
    }

    let contents = contents.ok_or_else(|| {
        AppError::BadRequest(format!("Missing multipart field '{UPLOAD_FIELD}'"))
    })?;
    if contents.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    // Stage the artifact under a fresh name so concurrent uploads never
    // collide.
    let file_path = format!("{IMPORTS_DIR}/{}.csv", Uuid::new_v4());
    state
        .artifact_store
        .save(&file_path, &contents)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))?;

    state
        .import_queue
        .send(ImportProductsJob::new(file_path.clone()))
        .await
        .map_err(|_| AppError::Internal("Import queue is closed".into()))?;

    tracing::info!(path = %file_path, "import job dispatched");

    Ok(Json(ImportDispatchResponse {
        message: "Import job dispatched.".to_string(),
        file_path,
    }))
}

/// GET /api/v1/products/count
///
/// Lightweight count endpoint, handy for polling import progress.
pub async fn count(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<serde_json::Value>> {
    let count = ProductRepo::count(&state.pool).await?;
    Ok(Json(json!({ "count": count })))
}

// Length limits count characters, not bytes, to match the CSV validator.
fn validate_product_fields(name: &str, price: f64, stock: i32) -> AppResult<()> {
    if name.trim().is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Name must be non-empty and at most {MAX_NAME_LENGTH} characters"
        ))));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "Price must be a non-negative number".into(),
        )));
    }
    if stock < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Stock must be a non-negative integer".into(),
        )));
    }
    Ok(())
}
