use axum::Json;
use serde_json::{json, Value};

/// Health check endpoint
///
/// Liveness only; does not touch the store.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
