// ---------------------------------------------------------------------------
// handlers/table.rs - Table view routes (/api/table/*)
// Same tool calls as /api/poker, but the relay keeps the table state, drains
// AI turns and answers with the adapted display model.
// ---------------------------------------------------------------------------

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::game::{PlayerAction, PokerGame};
use crate::models::{PlayerConfig, TableView};
use crate::state::{AppState, SharedGame};

use super::{ApiError, ApiJson, client_id};

#[derive(Debug, Default, Deserialize)]
pub struct CreateTableBody {
    #[serde(default)]
    pub players: Option<Vec<PlayerConfig>>,
}

#[derive(Debug, Deserialize)]
pub struct ActBody {
    pub action: PlayerAction,
    #[serde(default)]
    pub amount: Option<u64>,
}

fn lookup(state: &AppState, table_id: &str) -> Result<SharedGame, ApiError> {
    state
        .game(table_id)
        .ok_or_else(|| ApiError::NotFound(format!("table '{table_id}' is not open on this relay")))
}

fn view_of(game: &PokerGame<crate::mcp::ToolInvoker>) -> Result<Json<TableView>, ApiError> {
    game.view()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("table has no state yet".into()))
}

/// POST /api/table - body optional: `{ players: [{name, type, stack}] }`
pub async fn table_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TableView>, ApiError> {
    let req: CreateTableBody = if body.iter().all(u8::is_ascii_whitespace) {
        CreateTableBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid table request: {e}")))?
    };

    let invoker = state.invoker(client_id(&headers));
    let mut game = PokerGame::new(invoker, state.drain_settings());
    game.create_table(req.players).await?;

    let table_id = game
        .table_id()
        .map(String::from)
        .ok_or_else(|| ApiError::Upstream("server did not return a table id".into()))?;
    let view = view_of(&game)?;
    state.insert_game(&table_id, game);
    Ok(view)
}

/// GET /api/table/{table_id} - re-fetch and adapt.
pub async fn table_get(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
) -> Result<Json<TableView>, ApiError> {
    let shared = lookup(&state, &table_id)?;
    let mut game = shared.lock().await;
    game.refresh().await?;
    view_of(&game)
}

/// POST /api/table/{table_id}/deal
pub async fn table_deal(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
) -> Result<Json<TableView>, ApiError> {
    let shared = lookup(&state, &table_id)?;
    let mut game = shared.lock().await;
    game.deal_hand().await?;
    view_of(&game)
}

/// POST /api/table/{table_id}/act - `{ action, amount? }`
pub async fn table_act(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
    ApiJson(req): ApiJson<ActBody>,
) -> Result<Json<TableView>, ApiError> {
    let shared = lookup(&state, &table_id)?;
    let mut game = shared.lock().await;
    game.act(req.action, req.amount).await?;
    view_of(&game)
}

/// POST /api/table/{table_id}/settle - deal animation finished on the client.
pub async fn table_settle(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
) -> Result<Json<TableView>, ApiError> {
    let shared = lookup(&state, &table_id)?;
    let mut game = shared.lock().await;
    game.settle_deal();
    view_of(&game)
}
