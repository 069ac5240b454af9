//! Shared harness for HTTP-level integration tests.
//!
//! [`build_test_app`] mirrors the production startup path: it builds the
//! full middleware stack via `build_app_router` and spawns a real import
//! runner draining the job queue, backed by a per-test temporary storage
//! root.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tower::ServiceExt;

use catalog_api::auth::jwt::{generate_access_token, JwtConfig};
use catalog_api::background;
use catalog_api::config::ServerConfig;
use catalog_api::router::build_app_router;
use catalog_api::state::AppState;
use catalog_core::types::EntityId;
use catalog_importer::store::ArtifactStore;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Spawns a live import runner so `/products/import-csv` round-trips work
/// end to end. The temporary storage root is intentionally leaked; the
/// runner task may still reference it when the test body finishes.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let storage_dir = tempfile::tempdir().expect("tempdir creation should succeed");
    let artifact_store = Arc::new(ArtifactStore::new(storage_dir.path()));
    std::mem::forget(storage_dir);

    let (import_tx, import_rx) = mpsc::channel(16);
    tokio::spawn(background::import_runner::run(
        pool.clone(),
        Arc::clone(&artifact_store),
        import_rx,
        tokio_util::sync::CancellationToken::new(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        artifact_store,
        import_queue: import_tx,
    };

    build_app_router(state, &config)
}

/// Mint a valid access token for the given user without going through the
/// login endpoint. Uses the same secret as [`test_config`].
pub fn auth_token_for(user_id: EntityId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request build should succeed"),
    )
    .await
    .expect("request should succeed")
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request build should succeed"),
    )
    .await
    .expect("request should succeed")
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request build should succeed"),
    )
    .await
    .expect("request should succeed")
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .expect("request build should succeed"),
    )
    .await
    .expect("request should succeed")
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .expect("request build should succeed"),
    )
    .await
    .expect("request should succeed")
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request build should succeed"),
    )
    .await
    .expect("request should succeed")
}

/// POST a multipart/form-data body with one `file` field containing `csv`.
pub async fn post_csv_auth(app: Router, uri: &str, csv: &str, token: &str) -> Response<Body> {
    const BOUNDARY: &str = "------------------------test-boundary";

    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"products.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );

    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("request build should succeed"),
    )
    .await
    .expect("request should succeed")
}

/// Decode a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read should succeed");
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Assert a response has the expected status, with the body in the failure
/// message for easier debugging.
pub async fn assert_status(response: Response<Body>, expected: StatusCode) -> serde_json::Value {
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {json}");
    json
}
