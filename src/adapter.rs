//! Table snapshot → display model.
//!
//! `adapt` is a pure function of the last snapshot and the local human seat.
//! The display state is rebuilt from scratch for every snapshot.

use crate::cards::parse_cards;
use crate::models::{
    DealPhase, DisplayPlayer, DisplayState, PlayerKind, SeatSnapshot, Stage, TablePosition,
    TableSnapshot, TableStatus,
};

/// Seats rotate through these slots by `seat % POSITION_ORDER.len()`.
pub const POSITION_ORDER: [TablePosition; 5] = [
    TablePosition::TopLeft,
    TablePosition::TopRight,
    TablePosition::Right,
    TablePosition::Bottom,
    TablePosition::Left,
];

pub const RAISE_PRESETS: [u64; 4] = [25, 50, 100, 500];

pub fn position_for_seat(seat: usize) -> TablePosition {
    POSITION_ORDER[seat % POSITION_ORDER.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Badges {
    pub dealer: bool,
    pub small_blind: bool,
    pub big_blind: bool,
}

/// Dealer / blind badges for one seat.
///
/// Server-supplied flags are authoritative when the snapshot carries any of
/// them (they get heads-up right). Otherwise the blinds are assumed to sit
/// one and two seats after the button.
pub fn badges_for(snapshot: &TableSnapshot, seat: &SeatSnapshot) -> Badges {
    if has_server_badges(snapshot) {
        return Badges {
            dealer: seat.is_dealer.unwrap_or(false),
            small_blind: seat.is_small_blind.unwrap_or(false),
            big_blind: seat.is_big_blind.unwrap_or(false),
        };
    }

    let count = snapshot.effective_seat_count();
    if count == 0 {
        return Badges::default();
    }
    let dealer = snapshot.dealer_seat;
    Badges {
        dealer: seat.seat == dealer,
        small_blind: seat.seat == (dealer + 1) % count,
        big_blind: seat.seat == (dealer + 2) % count,
    }
}

fn has_server_badges(snapshot: &TableSnapshot) -> bool {
    snapshot.seats.iter().any(|s| {
        s.is_dealer.is_some() || s.is_small_blind.is_some() || s.is_big_blind.is_some()
    })
}

fn display_player(snapshot: &TableSnapshot, seat: &SeatSnapshot, human_seat: usize) -> DisplayPlayer {
    let badges = badges_for(snapshot, seat);
    DisplayPlayer {
        id: seat.seat.to_string(),
        seat: seat.seat,
        name: seat.player_name.clone(),
        chips: seat.stack,
        bet: seat.bet,
        cards: parse_cards(&seat.cards),
        show_cards: seat.seat == human_seat || snapshot.stage == Stage::Showdown,
        is_active: snapshot.actor_seat == Some(seat.seat),
        is_folded: seat.is_folded,
        is_dealer: badges.dealer,
        is_small_blind: badges.small_blind,
        is_big_blind: badges.big_blind,
        player_type: seat.player_type,
        position: position_for_seat(seat.seat),
    }
}

pub fn adapt(snapshot: &TableSnapshot, human_seat: usize) -> DisplayState {
    let players: Vec<DisplayPlayer> = snapshot
        .seats
        .iter()
        .map(|seat| display_player(snapshot, seat, human_seat))
        .collect();

    let max_bet = players.iter().map(|p| p.bet).max().unwrap_or(0);
    let human = players.iter().find(|p| p.seat == human_seat);
    let has_human = human.is_some();
    let human_bet = human.map_or(0, |p| p.bet);
    let human_stack = human.map_or(0, |p| p.chips);

    DisplayState {
        table_id: snapshot.table_id.clone(),
        hand_number: snapshot.hand_number,
        status: snapshot.status,
        stage: snapshot.stage,
        pot: snapshot.pot,
        community_cards: parse_cards(&snapshot.board),
        dealer_seat: snapshot.dealer_seat,
        actor_seat: snapshot.actor_seat,
        small_blind: snapshot.small_blind,
        big_blind: snapshot.big_blind,
        human_seat,
        can_check: has_human && human_bet == max_bet,
        call_amount: max_bet.saturating_sub(human_bet),
        is_my_turn: snapshot.actor_seat == Some(human_seat)
            && snapshot.status == TableStatus::Active,
        raise_presets: RAISE_PRESETS
            .iter()
            .copied()
            .filter(|&amount| amount <= human_stack)
            .collect(),
        players,
    }
}

/// True while the server is waiting on an AI seat.
pub fn awaiting_ai(snapshot: &TableSnapshot, human_seat: usize) -> Option<usize> {
    if snapshot.status != TableStatus::Active {
        return None;
    }
    let actor = snapshot.actor_seat.filter(|&a| a != human_seat)?;
    let seat = snapshot.seat(actor)?;
    (seat.player_type == PlayerKind::Ai).then_some(actor)
}

// ---------------------------------------------------------------------------
// Deal animation phase
// ---------------------------------------------------------------------------

/// `Idle → Dealing → Settled`, restarted whenever a new hand number shows up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DealAnimation {
    phase: DealPhase,
    hand_number: Option<u64>,
}

impl DealAnimation {
    pub fn phase(&self) -> DealPhase {
        self.phase
    }

    pub fn observe(&mut self, snapshot: &TableSnapshot) {
        if snapshot.hand_number == 0 {
            return;
        }
        if self.hand_number != Some(snapshot.hand_number) {
            self.hand_number = Some(snapshot.hand_number);
            self.phase = DealPhase::Dealing;
        }
    }

    pub fn settle(&mut self) {
        if self.phase == DealPhase::Dealing {
            self.phase = DealPhase::Settled;
        }
    }
}
