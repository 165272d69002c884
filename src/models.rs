use serde::{Deserialize, Serialize};

use crate::cards::Card;

// ---------------------------------------------------------------------------
// Remote table snapshot (wire form, owned by the MCP poker server)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Idle,
    Ready,
    #[default]
    Active,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    #[default]
    Ai,
}

/// One seat as reported by the server. Hole cards stay in wire form here;
/// the adapter decodes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatSnapshot {
    pub seat: usize,
    #[serde(default, alias = "name")]
    pub player_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_type: PlayerKind,
    #[serde(default, deserialize_with = "chips")]
    pub stack: u64,
    #[serde(default, deserialize_with = "chips")]
    pub bet: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_folded: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dealer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_small_blind: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_big_blind: Option<bool>,
}

/// The server reports "nobody to act" as null, an absent field, or `-1`.
fn seat_or_none<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| usize::try_from(s).ok()))
}

/// `null` reads as the type's default, the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Chip amount as the server sent it. `None` for null or non-finite values;
/// fractions are rounded and negatives clamp to zero.
fn chip_amount<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0).round() as u64))
}

fn chips<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(chip_amount(deserializer)?.unwrap_or(0))
}

fn small_blind_chips<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(chip_amount(deserializer)?.unwrap_or_else(default_small_blind))
}

fn big_blind_chips<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(chip_amount(deserializer)?.unwrap_or_else(default_big_blind))
}

fn default_small_blind() -> u64 {
    5
}

fn default_big_blind() -> u64 {
    10
}

/// Authoritative table state. Missing or null fields fall back to the values
/// a fresh 5/10 table would report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub table_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hand_number: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TableStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: Stage,
    #[serde(default, deserialize_with = "chips")]
    pub pot: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dealer_seat: usize,
    #[serde(default, deserialize_with = "seat_or_none")]
    pub actor_seat: Option<usize>,
    #[serde(default = "default_small_blind", deserialize_with = "small_blind_chips")]
    pub small_blind: u64,
    #[serde(default = "default_big_blind", deserialize_with = "big_blind_chips")]
    pub big_blind: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_count: Option<usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seats: Vec<SeatSnapshot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub board: Vec<String>,
}

impl TableSnapshot {
    pub fn seat(&self, index: usize) -> Option<&SeatSnapshot> {
        self.seats.iter().find(|s| s.seat == index)
    }

    /// Declared seat count, or the number of seats reported.
    pub fn effective_seat_count(&self) -> usize {
        self.seat_count.unwrap_or(self.seats.len())
    }
}

// ---------------------------------------------------------------------------
// Table creation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PlayerKind,
    pub stack: u64,
}

impl PlayerConfig {
    pub fn new(name: &str, kind: PlayerKind, stack: u64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            stack,
        }
    }

    /// One human ("You") facing four AI opponents, 1000 chips each.
    pub fn default_lineup() -> Vec<PlayerConfig> {
        vec![
            PlayerConfig::new("You", PlayerKind::Human, 1000),
            PlayerConfig::new("Sarah K.", PlayerKind::Ai, 1000),
            PlayerConfig::new("Mike R.", PlayerKind::Ai, 1000),
            PlayerConfig::new("Alex T.", PlayerKind::Ai, 1000),
            PlayerConfig::new("Jordan L.", PlayerKind::Ai, 1000),
        ]
    }
}

// ---------------------------------------------------------------------------
// Display model (derived locally from the last snapshot)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TablePosition {
    TopLeft,
    TopRight,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPlayer {
    pub id: String,
    pub seat: usize,
    pub name: String,
    pub chips: u64,
    pub bet: u64,
    pub cards: Vec<Card>,
    /// `false` means the cards are rendered face down.
    pub show_cards: bool,
    pub is_active: bool,
    pub is_folded: bool,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub player_type: PlayerKind,
    pub position: TablePosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealPhase {
    #[default]
    Idle,
    Dealing,
    Settled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub table_id: String,
    pub hand_number: u64,
    pub status: TableStatus,
    pub stage: Stage,
    pub pot: u64,
    pub players: Vec<DisplayPlayer>,
    pub community_cards: Vec<Card>,
    pub dealer_seat: usize,
    pub actor_seat: Option<usize>,
    pub small_blind: u64,
    pub big_blind: u64,
    pub human_seat: usize,
    pub can_check: bool,
    pub call_amount: u64,
    pub is_my_turn: bool,
    pub raise_presets: Vec<u64>,
}

impl DisplayState {
    pub fn human_player(&self) -> Option<&DisplayPlayer> {
        self.players.iter().find(|p| p.seat == self.human_seat)
    }
}

/// What the table view endpoints hand to the browser.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    #[serde(flatten)]
    pub state: DisplayState,
    pub deal_phase: DealPhase,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub app: String,
    pub uptime_seconds: u64,
    pub mcp_endpoint: String,
    pub sessions: usize,
    pub tables: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_fields_read_as_fresh_table_defaults() {
        let snap: TableSnapshot = serde_json::from_value(json!({
            "table_id": "t",
            "hand_number": null,
            "status": null,
            "stage": null,
            "pot": null,
            "dealer_seat": null,
            "actor_seat": null,
            "small_blind": null,
            "big_blind": null,
            "board": null,
            "seats": [{
                "seat": 0,
                "player_name": "You",
                "player_type": null,
                "stack": null,
                "bet": null,
                "is_folded": null,
                "cards": null
            }]
        }))
        .unwrap();

        assert_eq!(snap.hand_number, 0);
        assert_eq!(snap.status, TableStatus::Active);
        assert_eq!(snap.stage, Stage::Preflop);
        assert_eq!(snap.pot, 0);
        assert_eq!(snap.dealer_seat, 0);
        assert_eq!(snap.actor_seat, None);
        assert_eq!(snap.small_blind, 5);
        assert_eq!(snap.big_blind, 10);
        assert!(snap.board.is_empty());

        let seat = &snap.seats[0];
        assert_eq!(seat.player_type, PlayerKind::Ai);
        assert_eq!((seat.stack, seat.bet), (0, 0));
        assert!(!seat.is_folded);
        assert!(seat.cards.is_empty());
    }

    #[test]
    fn missing_blinds_use_defaults() {
        let snap: TableSnapshot = serde_json::from_value(json!({ "table_id": "t" })).unwrap();
        assert_eq!((snap.small_blind, snap.big_blind), (5, 10));
        assert!(snap.seats.is_empty());
    }

    #[test]
    fn chip_amounts_are_rounded_and_clamped() {
        let snap: TableSnapshot = serde_json::from_value(json!({
            "table_id": "t",
            "pot": 37.6,
            "small_blind": 2.5,
            "big_blind": 5,
            "seats": [
                { "seat": 0, "stack": -20, "bet": 12.4 },
                { "seat": 1, "stack": 995, "bet": 0.0 }
            ]
        }))
        .unwrap();

        assert_eq!(snap.pot, 38);
        assert_eq!(snap.small_blind, 3);
        assert_eq!(snap.big_blind, 5);
        assert_eq!(snap.seats[0].stack, 0);
        assert_eq!(snap.seats[0].bet, 12);
        assert_eq!(snap.seats[1].stack, 995);
    }

    #[test]
    fn wrong_types_still_fail() {
        let err = serde_json::from_value::<TableSnapshot>(json!({
            "table_id": "t",
            "pot": "lots"
        }));
        assert!(err.is_err());
    }
}
