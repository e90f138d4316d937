use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

use crate::server::AppState;

/// Health check endpoint handler.
///
/// Liveness only: answers as long as the process is serving requests.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status":"pong"}`
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "pong" }))
}

/// Readiness endpoint handler.
///
/// Reports whether the shared database connection is currently usable.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/health`
///
/// # HTTP Status Codes
/// - **200 OK**: database connected
/// - **503 Service Unavailable**: database lost and not (yet) reconnected
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.maps.is_connected() {
        (StatusCode::OK, Json(json!({ "status": "ok", "database": "connected" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "disconnected" })),
        )
    }
}
