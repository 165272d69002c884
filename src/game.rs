//! Table state holder: one remote table, seen from the human seat.
//!
//! Wraps a `ToolCaller`, keeps the last snapshot and its adapted display
//! state, and walks the AI seats forward after each human action.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::adapter::{DealAnimation, adapt, awaiting_ai};
use crate::mcp::{McpError, ToolCaller};
use crate::models::{DealPhase, DisplayState, PlayerConfig, PlayerKind, TableSnapshot, TableView};

pub const DEFAULT_SMALL_BLIND: u64 = 5;
pub const DEFAULT_BIG_BLIND: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error("unexpected table snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("no table has been created yet")]
    NoTable,

    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// The server kept handing the turn to AI seats.
    #[error("hand stalled: still waiting on AI seats after {steps} turns")]
    StalledHand { steps: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Raise,
}

impl PlayerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerAction::Fold => "fold",
            PlayerAction::Check => "check",
            PlayerAction::Call => "call",
            PlayerAction::Raise => "raise",
        }
    }
}

/// Pacing and bound for the AI-turn loop.
#[derive(Debug, Clone, Copy)]
pub struct DrainSettings {
    pub step_delay: Duration,
    pub max_steps: usize,
}

impl Default for DrainSettings {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(300),
            max_steps: 64,
        }
    }
}

pub struct PokerGame<C> {
    caller: C,
    settings: DrainSettings,
    table_id: Option<String>,
    human_seat: usize,
    snapshot: Option<TableSnapshot>,
    display: Option<DisplayState>,
    animation: DealAnimation,
    error: Option<String>,
}

impl<C: ToolCaller> PokerGame<C> {
    pub fn new(caller: C, settings: DrainSettings) -> Self {
        Self {
            caller,
            settings,
            table_id: None,
            human_seat: 0,
            snapshot: None,
            display: None,
            animation: DealAnimation::default(),
            error: None,
        }
    }

    pub fn table_id(&self) -> Option<&str> {
        self.table_id.as_deref()
    }

    pub fn human_seat(&self) -> usize {
        self.human_seat
    }

    pub fn snapshot(&self) -> Option<&TableSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn display(&self) -> Option<&DisplayState> {
        self.display.as_ref()
    }

    /// Banner text from the last failed operation, cleared by the next one.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn deal_phase(&self) -> DealPhase {
        self.animation.phase()
    }

    pub fn settle_deal(&mut self) {
        self.animation.settle();
    }

    pub fn view(&self) -> Option<TableView> {
        self.display.clone().map(|state| TableView {
            state,
            deal_phase: self.animation.phase(),
            error: self.error.clone(),
        })
    }

    // ── Actions ─────────────────────────────────────────────────────────

    /// Create a table. `None` seats the default lineup (you + four AI).
    pub async fn create_table(
        &mut self,
        players: Option<Vec<PlayerConfig>>,
    ) -> Result<DisplayState, GameError> {
        self.error = None;
        let result = self.create_table_inner(players).await;
        self.record(result)
    }

    /// Deal the next hand, creating a default table first if needed.
    pub async fn deal_hand(&mut self) -> Result<DisplayState, GameError> {
        self.error = None;
        let result = self.deal_hand_inner().await;
        self.record(result)
    }

    pub async fn act(
        &mut self,
        action: PlayerAction,
        amount: Option<u64>,
    ) -> Result<DisplayState, GameError> {
        self.error = None;
        let result = self.act_inner(action, amount).await;
        self.record(result)
    }

    pub async fn fold(&mut self) -> Result<DisplayState, GameError> {
        self.act(PlayerAction::Fold, None).await
    }

    pub async fn check(&mut self) -> Result<DisplayState, GameError> {
        self.act(PlayerAction::Check, None).await
    }

    pub async fn call(&mut self) -> Result<DisplayState, GameError> {
        self.act(PlayerAction::Call, None).await
    }

    pub async fn raise(&mut self, amount: u64) -> Result<DisplayState, GameError> {
        self.act(PlayerAction::Raise, Some(amount)).await
    }

    /// Re-fetch the table as seen from the human seat.
    pub async fn refresh(&mut self) -> Result<DisplayState, GameError> {
        self.error = None;
        let result = self.refresh_inner().await;
        self.record(result)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn record(&mut self, result: Result<DisplayState, GameError>) -> Result<DisplayState, GameError> {
        if let Err(e) = &result {
            tracing::warn!(table_id = ?self.table_id, "game: {}", e);
            self.error = Some(e.to_string());
        }
        result
    }

    fn require_table(&self) -> Result<String, GameError> {
        self.table_id.clone().ok_or(GameError::NoTable)
    }

    async fn create_table_inner(
        &mut self,
        players: Option<Vec<PlayerConfig>>,
    ) -> Result<DisplayState, GameError> {
        let players = players.unwrap_or_else(PlayerConfig::default_lineup);
        let human_seat = players
            .iter()
            .position(|p| p.kind == PlayerKind::Human)
            .unwrap_or(0);

        let value = self
            .caller
            .invoke(
                "create_table",
                json!({
                    "players": players,
                    "small_blind": DEFAULT_SMALL_BLIND,
                    "big_blind": DEFAULT_BIG_BLIND,
                }),
            )
            .await?;

        let snapshot = decode(value)?;
        tracing::info!(table_id = %snapshot.table_id, human_seat, "game: table created");
        self.human_seat = human_seat;
        Ok(self.apply(snapshot))
    }

    async fn deal_hand_inner(&mut self) -> Result<DisplayState, GameError> {
        if self.table_id.is_none() {
            self.create_table_inner(None).await?;
        }
        let table_id = self.require_table()?;

        let value = self
            .caller
            .invoke("deal_hand", json!({ "table_id": table_id }))
            .await?;
        let snapshot = decode(value)?;
        self.apply(snapshot.clone());
        self.drain_ai_turns(snapshot).await
    }

    async fn act_inner(
        &mut self,
        action: PlayerAction,
        amount: Option<u64>,
    ) -> Result<DisplayState, GameError> {
        let table_id = self.require_table()?;

        let mut args = json!({
            "table_id": table_id,
            "seat": self.human_seat,
            "action": action.as_str(),
        });
        if action == PlayerAction::Raise {
            let amount = amount
                .ok_or_else(|| GameError::InvalidAction("raise needs an amount".into()))?;
            args["amount"] = json!(amount);
        }

        let value = self.caller.invoke("act", args).await?;
        let snapshot = decode(value)?;
        self.apply(snapshot.clone());
        self.drain_ai_turns(snapshot).await
    }

    async fn refresh_inner(&mut self) -> Result<DisplayState, GameError> {
        let table_id = self.require_table()?;
        let value = self
            .caller
            .invoke(
                "get_state",
                json!({ "table_id": table_id, "seat": self.human_seat }),
            )
            .await?;
        Ok(self.apply(decode(value)?))
    }

    /// Trigger AI seats one at a time until the human is to act, the hand is
    /// over, a call fails, or `max_steps` is exhausted.
    async fn drain_ai_turns(&mut self, snapshot: TableSnapshot) -> Result<DisplayState, GameError> {
        let mut current = snapshot;
        let mut steps = 0;

        while let Some(actor) = awaiting_ai(&current, self.human_seat) {
            if steps >= self.settings.max_steps {
                return Err(GameError::StalledHand { steps });
            }
            steps += 1;

            tracing::debug!(table_id = %current.table_id, seat = actor, step = steps, "game: trigger_ai");
            let value = self
                .caller
                .invoke(
                    "trigger_ai",
                    json!({ "table_id": current.table_id, "seat": actor }),
                )
                .await?;
            current = decode(value)?;
            self.apply(current.clone());

            if !self.settings.step_delay.is_zero() {
                tokio::time::sleep(self.settings.step_delay).await;
            }
        }

        Ok(adapt(&current, self.human_seat))
    }

    fn apply(&mut self, snapshot: TableSnapshot) -> DisplayState {
        let display = adapt(&snapshot, self.human_seat);
        self.animation.observe(&snapshot);
        if !snapshot.table_id.is_empty() {
            self.table_id = Some(snapshot.table_id.clone());
        }
        self.snapshot = Some(snapshot);
        self.display = Some(display.clone());
        display
    }
}

fn decode(value: Value) -> Result<TableSnapshot, GameError> {
    Ok(serde_json::from_value(value)?)
}
