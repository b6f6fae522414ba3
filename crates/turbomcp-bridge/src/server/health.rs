//! Liveness endpoints

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use super::AppState;

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "turbomcp-bridge";

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": crate::VERSION,
    }))
}

/// `GET /test`
pub async fn test(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Bridge is running",
        "auth_enabled": !state.config.auth.disabled,
    }))
}
