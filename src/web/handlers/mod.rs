pub mod dependencies;
pub mod discovery;
pub mod monitor;
pub mod routes;
pub mod services;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe for this process itself. Always 200 — used both by
/// operators and, when self-registration is enabled, by this process's own
/// health engine probing its own service row.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
