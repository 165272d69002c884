pub mod adapter;
pub mod cards;
pub mod config;
pub mod game;
pub mod handlers;
pub mod mcp;
pub mod models;
pub mod state;

use axum::Router;
use axum::routing::{get, post};

use state::AppState;

/// Build the application router with the given state.
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a network port.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health))
        .route("/api/health/ready", get(handlers::readiness))
        // MCP passthroughs
        .route("/api/mcp/initialize", post(handlers::mcp_initialize))
        .route("/api/mcp/tools/list", post(handlers::tools_list))
        .route("/api/mcp/tools/call", post(handlers::tools_call))
        .route("/api/mcp/resources/list", post(handlers::resources_list))
        .route("/api/mcp/resources/read", post(handlers::resources_read))
        // Poker actions (raw envelopes)
        .route("/api/poker/table", post(handlers::poker_create_table))
        .route("/api/poker/deal", post(handlers::poker_deal))
        .route("/api/poker/fold", post(handlers::poker_fold))
        .route("/api/poker/check", post(handlers::poker_check))
        .route("/api/poker/call", post(handlers::poker_call))
        .route("/api/poker/raise", post(handlers::poker_raise))
        .route("/api/poker/game/{game_id}", get(handlers::poker_game_state))
        // Table views (adapted display state)
        .route("/api/table", post(handlers::table_create))
        .route("/api/table/{table_id}", get(handlers::table_get))
        .route("/api/table/{table_id}/deal", post(handlers::table_deal))
        .route("/api/table/{table_id}/act", post(handlers::table_act))
        .route("/api/table/{table_id}/settle", post(handlers::table_settle))
        // Shared state
        .with_state(state)
}
