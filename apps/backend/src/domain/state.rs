use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::bidding::{BidStatus, Bidding};
use crate::domain::cards_types::Card;
use crate::domain::game::{Game, GameOptions, GameType};
use crate::domain::history::{GameHistory, RoundSummary};
use crate::errors::domain::{DomainError, ValidationKind};

/// Seat index into `Table::players`, clockwise.
pub type Seat = usize;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 4;
pub const ACTIVE_PLAYERS: usize = 3;
pub const DECK_SIZE: usize = 32;

/// Overall round progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Players gather; no cards dealt.
    NotStarted,
    /// Mittelhand and Hinterhand bid against the survivor.
    Bidding,
    /// Declarer picks up the skat or plays Hand.
    SkatDecision,
    /// Declarer discards (after pickup) and names the game.
    GameDeclaration,
    /// Tricks are played and collected.
    Play,
    /// Scored; waiting for the next round.
    RoundEnd,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub hand: Vec<Card>,
    pub bid_status: BidStatus,
    pub tournament_score: i32,
    /// Cards won in collected tricks this round.
    pub stitches: Vec<Card>,
    pub tricks_won: u32,
    pub is_computer: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, is_computer: bool) -> Self {
        Self {
            name: name.into(),
            hand: Vec::new(),
            bid_status: BidStatus::Idle,
            tournament_score: 0,
            stitches: Vec::new(),
            tricks_won: 0,
            is_computer,
        }
    }

    fn clear_round(&mut self) {
        self.hand.clear();
        self.bid_status = BidStatus::Idle;
        self.stitches.clear();
        self.tricks_won = 0;
    }
}

/// Cards played to one trick, in play order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Trick {
    pub leader: Seat,
    pub plays: Vec<(Seat, Card)>,
}

impl Trick {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            plays: Vec::new(),
        }
    }

    pub fn lead_card(&self) -> Option<Card> {
        self.plays.first().map(|(_, c)| *c)
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == ACTIVE_PLAYERS
    }

    pub fn cards(&self) -> Vec<Card> {
        self.plays.iter().map(|(_, c)| *c).collect()
    }
}

/// A speed-up request waiting for the other human players.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SpeedUp {
    pub requested_by: Seat,
    pub confirmed: Vec<Seat>,
}

/// Aggregate root for one table: seats, the running round and its history.
///
/// `game_player`, `current_player` and `inactive_player` are seat references
/// and are not serialized; wire formats carry them as names and re-link them
/// with [`Table::seat_of`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub players: Vec<Player>,
    pub dealer: Seat,
    #[serde(skip)]
    pub inactive_player: Option<Seat>,
    #[serde(skip)]
    pub game_player: Option<Seat>,
    #[serde(skip)]
    pub current_player: Option<Seat>,
    pub phase: Phase,
    pub skat: Vec<Card>,
    /// Skat as dealt, kept for history.
    pub original_skat: Vec<Card>,
    pub skat_picked_up: bool,
    pub bidding: Option<Bidding>,
    /// Winning bid; 0 until bidding resolves.
    pub bid_value: u32,
    /// Declarer's dealt hand plus the skat, for counting matadors.
    pub declarer_cards: Vec<Card>,
    pub game_type: Option<GameType>,
    pub options: GameOptions,
    pub trick: Option<Trick>,
    /// Collected tricks of the running round, oldest first.
    pub played_tricks: Vec<Trick>,
    pub speed_up: Option<SpeedUp>,
    /// Remaining tricks are being (or were) auto-resolved with open hands.
    pub is_speed_up: bool,
    pub game_counter: u32,
    pub history: Vec<GameHistory>,
    pub last_result: Option<RoundSummary>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            dealer: 0,
            inactive_player: None,
            game_player: None,
            current_player: None,
            phase: Phase::NotStarted,
            skat: Vec::new(),
            original_skat: Vec::new(),
            skat_picked_up: false,
            bidding: None,
            bid_value: 0,
            declarer_cards: Vec::new(),
            game_type: None,
            options: GameOptions::default(),
            trick: None,
            played_tricks: Vec::new(),
            speed_up: None,
            is_speed_up: false,
            game_counter: 0,
            history: Vec::new(),
            last_result: None,
        }
    }

    pub fn seat_of(&self, name: &str) -> Option<Seat> {
        self.players.iter().position(|p| p.name == name)
    }

    pub fn name_of(&self, seat: Seat) -> Option<&str> {
        self.players.get(seat).map(|p| p.name.as_str())
    }

    pub fn is_round_in_progress(&self) -> bool {
        !matches!(self.phase, Phase::NotStarted | Phase::RoundEnd)
    }

    pub fn is_active(&self, seat: Seat) -> bool {
        seat < self.players.len() && self.inactive_player != Some(seat)
    }

    /// Declared game, once a game type is set.
    pub fn game(&self) -> Option<Game> {
        self.game_type.map(|t| Game::new(t, self.options))
    }

    /// Whether any card of the running game has been played.
    pub fn first_card_played(&self) -> bool {
        !self.played_tricks.is_empty() || self.trick.as_ref().is_some_and(|t| !t.plays.is_empty())
    }

    /// Next seat clockwise, skipping the inactive seat.
    pub fn next_active(&self, seat: Seat) -> Seat {
        let n = self.players.len().max(1);
        let mut next = (seat + 1) % n;
        if Some(next) == self.inactive_player {
            next = (next + 1) % n;
        }
        next
    }

    /// Active seats as (Vorhand, Mittelhand, Hinterhand) for the current dealer.
    pub fn positions(&self) -> [Seat; ACTIVE_PLAYERS] {
        let vorhand = self.next_active(self.dealer);
        let mittelhand = self.next_active(vorhand);
        let hinterhand = self.next_active(mittelhand);
        [vorhand, mittelhand, hinterhand]
    }

    pub fn vorhand(&self) -> Seat {
        self.positions()[0]
    }

    /// Add a player at the next free seat.
    pub fn add_player(&mut self, name: impl Into<String>, is_computer: bool) -> Seat {
        self.players.push(Player::new(name, is_computer));
        self.players.len() - 1
    }

    /// Remove a player; any running round is aborted first.
    pub fn remove_player(&mut self, seat: Seat) -> Option<Player> {
        if seat >= self.players.len() {
            return None;
        }
        self.abort_round();
        let removed = self.players.remove(seat);
        self.dealer = 0;
        Some(removed)
    }

    /// Drop all round state and return to `NotStarted`. Scores and history stay.
    pub fn abort_round(&mut self) {
        for p in &mut self.players {
            p.clear_round();
        }
        self.clear_round_state();
        self.inactive_player = None;
        self.phase = Phase::NotStarted;
    }

    pub(crate) fn clear_round_state(&mut self) {
        self.game_player = None;
        self.current_player = None;
        self.skat.clear();
        self.original_skat.clear();
        self.skat_picked_up = false;
        self.bidding = None;
        self.bid_value = 0;
        self.declarer_cards.clear();
        self.game_type = None;
        self.options = GameOptions::default();
        self.trick = None;
        self.played_tricks.clear();
        self.speed_up = None;
        self.is_speed_up = false;
    }

    /// Every card currently on the table: hands, skat, stitches and the open trick.
    pub fn all_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = Vec::with_capacity(DECK_SIZE);
        for p in &self.players {
            cards.extend(p.hand.iter().copied());
            cards.extend(p.stitches.iter().copied());
        }
        cards.extend(self.skat.iter().copied());
        if let Some(trick) = &self.trick {
            cards.extend(trick.cards());
        }
        cards
    }

    /// Either nothing is dealt, or the 32 cards are partitioned without duplicates.
    pub fn cards_partitioned(&self) -> bool {
        let cards = self.all_cards();
        if cards.is_empty() {
            return !self.is_round_in_progress();
        }
        let distinct: HashSet<Card> = cards.iter().copied().collect();
        cards.len() == DECK_SIZE && distinct.len() == DECK_SIZE
    }

    /// Every seat index held by the table, the round state included.
    fn stored_seats(&self) -> impl Iterator<Item = Seat> + '_ {
        let tricks = self.trick.iter().chain(&self.played_tricks);
        let trick_seats = tricks.flat_map(|t| {
            std::iter::once(t.leader).chain(t.plays.iter().map(|(seat, _)| *seat))
        });
        let bidding_seats = self.bidding.iter().flat_map(|b| {
            [Some(b.turn), Some(b.listener), b.sayer, b.pending]
                .into_iter()
                .flatten()
        });
        let speed_up_seats = self.speed_up.iter().flat_map(|s| {
            std::iter::once(s.requested_by).chain(s.confirmed.iter().copied())
        });
        [
            Some(self.dealer),
            self.inactive_player,
            self.game_player,
            self.current_player,
        ]
        .into_iter()
        .flatten()
        .chain(trick_seats)
        .chain(bidding_seats)
        .chain(speed_up_seats)
    }

    /// Check the structural invariants a decoded or mutated table must hold.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.players.len() > MAX_PLAYERS {
            return Err(DomainError::validation(
                ValidationKind::InvalidState,
                "too many players",
            ));
        }
        let names: HashSet<&str> = self.players.iter().map(|p| p.name.as_str()).collect();
        if names.len() != self.players.len() {
            return Err(DomainError::validation(
                ValidationKind::InvalidState,
                "duplicate player names",
            ));
        }
        if !self.cards_partitioned() {
            return Err(DomainError::validation(
                ValidationKind::InvalidState,
                "cards are not a partition of the deck",
            ));
        }
        let n = self.players.len();
        if n > 0 && self.stored_seats().any(|s| s >= n) {
            return Err(DomainError::validation(
                ValidationKind::InvalidState,
                "seat index out of range",
            ));
        }
        let seat_ok = |s: Option<Seat>| s.map_or(true, |s| self.is_active(s));
        if !seat_ok(self.current_player) || !seat_ok(self.game_player) {
            return Err(DomainError::validation(
                ValidationKind::InvalidState,
                "seat reference points at an inactive or missing player",
            ));
        }
        if self.is_round_in_progress() && self.phase != Phase::Bidding && self.game_player.is_none()
        {
            return Err(DomainError::validation(
                ValidationKind::InvalidState,
                "round without declarer",
            ));
        }
        Ok(())
    }
}

pub fn require_game_player(table: &Table, ctx: &'static str) -> Result<Seat, DomainError> {
    table.game_player.ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidState,
            format!("Invariant violated: game_player must be set ({ctx})"),
        )
    })
}

pub fn require_game_type(table: &Table, ctx: &'static str) -> Result<GameType, DomainError> {
    table.game_type.ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidState,
            format!("Invariant violated: game_type must be set ({ctx})"),
        )
    })
}
