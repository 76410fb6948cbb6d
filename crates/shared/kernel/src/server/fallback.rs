use axum::Json;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use serde_json::json;
use tracing::debug;

/// Answers any request no route matched.
#[allow(clippy::unused_async)]
pub async fn unknown_endpoint(uri: Uri) -> impl IntoResponse {
    debug!(%uri, "Unknown endpoint");
    (StatusCode::NOT_FOUND, Json(json!({ "error": "unknown endpoint" })))
}
