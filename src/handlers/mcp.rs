// ---------------------------------------------------------------------------
// handlers/mcp.rs - Generic MCP passthroughs (/api/mcp/*)
// ---------------------------------------------------------------------------

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;

use super::{ApiError, ApiJson, client_id};

#[derive(Debug, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ReadResourceRequest {
    pub uri: String,
}

/// POST /api/mcp/initialize - fresh handshake for this client's session.
pub async fn mcp_initialize(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let invoker = state.invoker(client_id(&headers));
    Ok(Json(invoker.initialize().await?))
}

/// POST /api/mcp/tools/list
pub async fn tools_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let invoker = state.invoker(client_id(&headers));
    Ok(Json(invoker.list_tools().await?))
}

/// POST /api/mcp/tools/call - `{ name, arguments }`
pub async fn tools_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<ToolCallRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("missing 'name' field".into()));
    }
    let invoker = state.invoker(client_id(&headers));
    let arguments = req.arguments.unwrap_or_else(|| json!({}));
    Ok(Json(invoker.call_tool(&req.name, arguments).await?))
}

/// POST /api/mcp/resources/list
pub async fn resources_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let invoker = state.invoker(client_id(&headers));
    Ok(Json(invoker.list_resources().await?))
}

/// POST /api/mcp/resources/read - `{ uri }`
pub async fn resources_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<ReadResourceRequest>,
) -> Result<Json<Value>, ApiError> {
    let invoker = state.invoker(client_id(&headers));
    Ok(Json(invoker.read_resource(&req.uri).await?))
}
