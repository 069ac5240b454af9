//! Route definitions for the `/vendors` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::vendor;
use crate::state::AppState;

/// Routes mounted at `/vendors`.
///
/// ```text
/// GET    /        -> list own vendors
/// POST   /        -> create vendor
/// GET    /all     -> list every vendor (admin only)
/// GET    /{id}    -> get (owner only)
/// PUT    /{id}    -> update (owner only)
/// DELETE /{id}    -> delete (owner only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(vendor::list).post(vendor::create))
        .route("/all", get(vendor::list_all))
        .route(
            "/{id}",
            get(vendor::get).put(vendor::update).delete(vendor::delete),
        )
}
