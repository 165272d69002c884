// ---------------------------------------------------------------------------
// handlers/ - HTTP surface of the relay
// Sub-modules for logical grouping; mod.rs re-exports the handlers used by
// `crate::create_router` and holds the shared error type.
// ---------------------------------------------------------------------------

pub(crate) mod mcp;
pub(crate) mod poker;
pub(crate) mod system;
pub(crate) mod table;

// ── Re-exports ──────────────────────────────────────────────────────────────

// Health
pub use system::{health, readiness};

// MCP passthroughs
pub use mcp::{mcp_initialize, resources_list, resources_read, tools_call, tools_list};

// Poker convenience routes (raw envelopes)
pub use poker::{
    poker_call, poker_check, poker_create_table, poker_deal, poker_fold, poker_game_state,
    poker_raise,
};

// Table view routes (adapted display state)
pub use table::{table_act, table_create, table_deal, table_get, table_settle};

// ── Shared helpers ──────────────────────────────────────────────────────────

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::game::GameError;
use crate::mcp::McpError;

/// Header that selects which MCP session a request runs under.
pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const DEFAULT_CLIENT_ID: &str = "default";

pub(crate) fn client_id(headers: &HeaderMap) -> &str {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CLIENT_ID)
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// `Json<T>` whose rejection is an `ApiError`, so malformed bodies get the
/// same 400 `{error, request_id}` shape as every other failure.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// `Query<T>` with an `ApiError` rejection.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for all handlers.
/// Logs full details server-side, returns a flat JSON body to the browser:
///
/// ```json
/// { "error": "Human-readable description", "request_id": "uuid" }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport, protocol or tool failure reaching the MCP server.
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown in the browser's error banner.
    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Upstream(m) => m,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<McpError> for ApiError {
    fn from(e: McpError) -> Self {
        ApiError::Upstream(e.to_string())
    }
}

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::NoTable => ApiError::NotFound(e.to_string()),
            GameError::InvalidAction(m) => ApiError::BadRequest(m),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let request_id = Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            code = self.error_code(),
            "API error ({}): {}",
            status.as_u16(),
            self
        );

        let body = json!({
            "error": self.message(),
            "request_id": request_id,
        });
        (status, Json(body)).into_response()
    }
}
