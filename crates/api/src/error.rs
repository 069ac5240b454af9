//! API error type and HTTP response mapping.
//!
//! Every handler returns [`AppResult`]; errors are converted into JSON
//! responses of the shape `{"error": "...", "code": "..."}` with an
//! appropriate status code. Internal details (database errors in
//! particular) are logged server-side and never leaked to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::error::CoreError;
use serde_json::json;

/// Convenience alias used by all handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Top-level API error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain-level error from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database error. Mapped to 404/409/500 depending on the cause.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed request (bad body, bad multipart, bad query).
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(core) => {
                let (status, code) = match &core {
                    CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    CoreError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION"),
                    CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                    CoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                    CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                    CoreError::Internal(msg) => {
                        tracing::error!(error = %msg, "internal core error");
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
                    }
                };
                (status, code, core.to_string())
            }
            AppError::Database(e) => classify_sqlx_error(e),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message, "code": code }));
        (status, body).into_response()
    }
}

/// Map a `sqlx::Error` onto an HTTP status, code, and safe message.
///
/// Unique-constraint violations (Postgres code 23505) on constraints
/// following the `uq_` naming convention become 409 Conflict; everything
/// else is a sanitized 500.
fn classify_sqlx_error(e: sqlx::Error) -> (StatusCode, &'static str, String) {
    match &e {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        "A record with this value already exists".to_string(),
                    );
                }
            }
            tracing::error!(error = %e, "database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal server error".to_string(),
            )
        }
        _ => {
            tracing::error!(error = %e, "database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal server error".to_string(),
            )
        }
    }
}
