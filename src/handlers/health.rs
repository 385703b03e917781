use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness endpoint. Always reports ok; it reflects process health, not
/// the state of the backing store.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
