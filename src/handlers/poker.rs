// ---------------------------------------------------------------------------
// handlers/poker.rs - Per-action convenience routes (/api/poker/*)
// Each one maps onto a single remote tool call and returns the raw envelope.
// ---------------------------------------------------------------------------

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::game::{DEFAULT_BIG_BLIND, DEFAULT_SMALL_BLIND, PlayerAction};
use crate::models::PlayerConfig;
use crate::state::AppState;

use super::{ApiError, ApiJson, ApiQuery, client_id};

#[derive(Debug, Deserialize)]
pub struct PokerActionRequest {
    #[serde(alias = "gameId")]
    pub table_id: String,
    /// Acting seat; the default lineup seats the human at 0.
    #[serde(default, alias = "playerId")]
    pub seat: Option<usize>,
    #[serde(default)]
    pub amount: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTableRequest {
    #[serde(default)]
    pub players: Option<Vec<PlayerConfig>>,
    #[serde(default)]
    pub small_blind: Option<u64>,
    #[serde(default)]
    pub big_blind: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct GameStateQuery {
    #[serde(default)]
    pub seat: Option<usize>,
}

async fn forward(
    state: &AppState,
    headers: &HeaderMap,
    tool: &str,
    arguments: Value,
) -> Result<Json<Value>, ApiError> {
    let invoker = state.invoker(client_id(headers));
    Ok(Json(invoker.call_tool(tool, arguments).await?))
}

async fn forward_action(
    state: &AppState,
    headers: &HeaderMap,
    req: PokerActionRequest,
    action: PlayerAction,
) -> Result<Json<Value>, ApiError> {
    let mut args = json!({
        "table_id": req.table_id,
        "seat": req.seat.unwrap_or(0),
        "action": action.as_str(),
    });
    if action == PlayerAction::Raise {
        let amount = req
            .amount
            .ok_or_else(|| ApiError::BadRequest("raise needs an 'amount'".into()))?;
        args["amount"] = json!(amount);
    }
    forward(state, headers, "act", args).await
}

/// POST /api/poker/table
pub async fn poker_create_table(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateTableRequest>,
) -> Result<Json<Value>, ApiError> {
    let args = json!({
        "players": req.players.unwrap_or_else(PlayerConfig::default_lineup),
        "small_blind": req.small_blind.unwrap_or(DEFAULT_SMALL_BLIND),
        "big_blind": req.big_blind.unwrap_or(DEFAULT_BIG_BLIND),
    });
    forward(&state, &headers, "create_table", args).await
}

/// POST /api/poker/deal
pub async fn poker_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<PokerActionRequest>,
) -> Result<Json<Value>, ApiError> {
    forward(&state, &headers, "deal_hand", json!({ "table_id": req.table_id })).await
}

/// POST /api/poker/fold
pub async fn poker_fold(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<PokerActionRequest>,
) -> Result<Json<Value>, ApiError> {
    forward_action(&state, &headers, req, PlayerAction::Fold).await
}

/// POST /api/poker/check
pub async fn poker_check(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<PokerActionRequest>,
) -> Result<Json<Value>, ApiError> {
    forward_action(&state, &headers, req, PlayerAction::Check).await
}

/// POST /api/poker/call
pub async fn poker_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<PokerActionRequest>,
) -> Result<Json<Value>, ApiError> {
    forward_action(&state, &headers, req, PlayerAction::Call).await
}

/// POST /api/poker/raise
pub async fn poker_raise(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<PokerActionRequest>,
) -> Result<Json<Value>, ApiError> {
    forward_action(&state, &headers, req, PlayerAction::Raise).await
}

/// GET /api/poker/game/{game_id}?seat=N
pub async fn poker_game_state(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(game_id): Path<String>,
    ApiQuery(q): ApiQuery<GameStateQuery>,
) -> Result<Json<Value>, ApiError> {
    let args = json!({ "table_id": game_id, "seat": q.seat.unwrap_or(0) });
    forward(&state, &headers, "get_state", args).await
}
