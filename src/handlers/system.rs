// ---------------------------------------------------------------------------
// handlers/system.rs - Health and readiness
// ---------------------------------------------------------------------------

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: if state.is_ready() { "ok" } else { "starting" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        app: "pokertable-relay".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        mcp_endpoint: state.config.mcp_url.to_string(),
        sessions: state.session_count(),
        tables: state.table_count(),
    })
}

/// GET /api/health/ready - lightweight readiness probe (no locks).
pub async fn readiness(State(state): State<AppState>) -> axum::response::Response {
    let ready = state.is_ready();
    let uptime = state.start_time.elapsed().as_secs();
    let body = json!({ "ready": ready, "uptime_seconds": uptime });

    if ready {
        (StatusCode::OK, Json(body)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}
