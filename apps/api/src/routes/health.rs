use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness only: does not check that the model provider is reachable.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
