//! Route definitions for the `/products` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::product;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /            -> list (with vendor names)
/// POST   /            -> create
/// GET    /count       -> product count
/// POST   /import-csv  -> upload CSV, dispatch import job
/// GET    /{id}        -> get
/// PUT    /{id}        -> update
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::list).post(product::create))
        .route("/count", get(product::count))
        .route("/import-csv", post(product::import_csv))
        .route(
            "/{id}",
            get(product::get)
                .put(product::update)
                .delete(product::delete),
        )
}
