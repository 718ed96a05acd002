use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Basic liveness probe to verify the scaffold is wired correctly.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Backend scaffold ready"
    }))
}
