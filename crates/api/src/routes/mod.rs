pub mod auth;
pub mod health;
pub mod product;
pub mod vendor;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/refresh                  refresh (public)
/// /auth/logout                   logout (requires auth)
/// /auth/me                       current user (requires auth)
///
/// /vendors                       list own, create (requires auth)
/// /vendors/all                   list every vendor (admin only)
/// /vendors/{id}                  get, update, delete (owner only)
///
/// /products                      list, create (requires auth)
/// /products/count                product count (requires auth)
/// /products/import-csv           CSV bulk import upload (requires auth)
/// /products/{id}                 get, update, delete (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/vendors", vendor::router())
        .nest("/products", product::router())
}
