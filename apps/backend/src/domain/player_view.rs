//! Player view of the table: what one seated player (or a spectator) may see.
//!
//! The own hand is visible, the other hands are hidden unless an Ouvert
//! declarer's hand is face-up or a speed-up revealed all hands. Capability
//! flags and message labels are computed here so transport layers stay thin.

use serde::Serialize;

use crate::domain::bidding::{next_bid_above, BidStatus};
use crate::domain::capabilities::Capabilities;
use crate::domain::cards_logic::sort_hand;
use crate::domain::cards_types::Card;
use crate::domain::game::Game;
use crate::domain::history::RoundSummary;
use crate::domain::state::{Phase, Seat, Table, Trick, MIN_PLAYERS};
use crate::domain::tricks::{legal_moves, trick_winner};

#[derive(Debug, Clone, Serialize)]
pub struct PlayView {
    pub player: String,
    pub card: Card,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    pub name: String,
    pub is_computer: bool,
    pub is_active: bool,
    pub is_dealer: bool,
    pub is_declarer: bool,
    pub bid_status: BidStatus,
    pub tournament_score: i32,
    pub tricks_won: u32,
    pub card_count: usize,
    /// Face-up cards of this seat, when the viewer may see them.
    pub open_hand: Option<Vec<Card>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeedUpView {
    pub requested_by: String,
    pub confirmed: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub version: u64,
    pub phase: Phase,
    pub me: Option<String>,
    pub hand: Vec<Card>,
    pub legal_cards: Vec<Card>,
    pub players: Vec<SeatView>,
    pub skat: Vec<Card>,
    pub trick: Vec<PlayView>,
    pub last_trick: Option<Vec<PlayView>>,
    pub current_player: Option<String>,
    pub game_player: Option<String>,
    /// Highest bid so far; during bidding this is the live value to beat.
    pub bid_value: u32,
    /// Next ladder value the viewer may bid, when it is their turn to offer.
    pub next_bid: Option<u32>,
    pub game: Option<Game>,
    pub game_description: Option<String>,
    pub speed_up: Option<SpeedUpView>,
    pub is_speed_up: bool,
    pub game_counter: u32,
    pub last_result: Option<RoundSummary>,
    pub capabilities: Capabilities,
    pub message: String,
}

impl PlayerView {
    /// Project `table` for `viewer`; `None` is a spectator.
    pub fn build(table: &Table, viewer: Option<Seat>, version: u64) -> Self {
        let name = |seat: Seat| table.name_of(seat).unwrap_or_default().to_string();
        let plays = |trick: &Trick| -> Vec<PlayView> {
            trick
                .plays
                .iter()
                .map(|(seat, card)| PlayView {
                    player: name(*seat),
                    card: *card,
                })
                .collect()
        };

        let ouvert_open = table.options.ouvert && table.phase == Phase::Play;
        let reveal_all = table.is_speed_up || table.phase == Phase::RoundEnd;
        let players = table
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| {
                let is_declarer = table.game_player == Some(seat);
                let visible = Some(seat) != viewer && (reveal_all || (ouvert_open && is_declarer));
                SeatView {
                    name: p.name.clone(),
                    is_computer: p.is_computer,
                    is_active: table.is_round_in_progress() && table.is_active(seat),
                    is_dealer: table.phase != Phase::NotStarted && table.dealer == seat,
                    is_declarer,
                    bid_status: p.bid_status,
                    tournament_score: p.tournament_score,
                    tricks_won: p.tricks_won,
                    card_count: p.hand.len(),
                    open_hand: visible.then(|| sorted(&p.hand, table)),
                }
            })
            .collect();

        let hand = viewer
            .and_then(|s| table.players.get(s))
            .map(|p| sorted(&p.hand, table))
            .unwrap_or_default();
        let legal_cards = viewer.map(|s| legal_moves(table, s)).unwrap_or_default();

        let is_declarer = viewer.is_some() && viewer == table.game_player;
        let skat = if (is_declarer && table.skat_picked_up) || table.phase == Phase::RoundEnd {
            table.skat.clone()
        } else {
            Vec::new()
        };

        let capabilities = Capabilities::for_seat(table, viewer);
        let last_trick = (capabilities.can_view_last_stitch || table.phase == Phase::RoundEnd)
            .then(|| table.played_tricks.last().map(plays))
            .flatten();

        let bid_value = table.bidding.as_ref().map_or(table.bid_value, |b| b.value);
        let next_bid = if capabilities.can_bid {
            next_bid_above(bid_value)
        } else {
            None
        };

        Self {
            version,
            phase: table.phase,
            me: viewer.map(name),
            hand,
            legal_cards,
            players,
            skat,
            trick: table.trick.as_ref().map(plays).unwrap_or_default(),
            last_trick,
            current_player: table.current_player.map(name),
            game_player: table.game_player.map(name),
            bid_value,
            next_bid,
            game: table.game(),
            game_description: table.game().map(|g| g.describe()),
            speed_up: table.speed_up.as_ref().map(|s| SpeedUpView {
                requested_by: name(s.requested_by),
                confirmed: s.confirmed.iter().map(|&c| name(c)).collect(),
            }),
            is_speed_up: table.is_speed_up,
            game_counter: table.game_counter,
            last_result: table.last_result.clone(),
            capabilities,
            message: message(table),
        }
    }
}

fn sorted(cards: &[Card], table: &Table) -> Vec<Card> {
    let mut cards = cards.to_vec();
    sort_hand(&mut cards, table.game_type);
    cards
}

/// Status line for the table, in English.
pub fn message(table: &Table) -> String {
    let name = |seat: Option<Seat>| {
        seat.and_then(|s| table.name_of(s))
            .unwrap_or("nobody")
            .to_string()
    };
    match table.phase {
        Phase::NotStarted if table.players.len() < MIN_PLAYERS => format!(
            "Waiting for players ({}/{MIN_PLAYERS})",
            table.players.len()
        ),
        Phase::NotStarted => "Waiting for everyone to start the round".to_string(),
        Phase::Bidding => {
            let Some(bidding) = &table.bidding else {
                return "Bidding".to_string();
            };
            let current = name(table.current_player);
            match bidding.sayer {
                Some(sayer) if Some(sayer) == table.current_player => {
                    format!("{current} to bid (at {})", bidding.value)
                }
                Some(_) => format!("{current} to hold or pass {}", bidding.value),
                None => format!("{current} to open or pass"),
            }
        }
        Phase::SkatDecision => format!(
            "{} bid {} and picks up the skat or plays Hand",
            name(table.game_player),
            table.bid_value
        ),
        Phase::GameDeclaration => format!("{} declares the game", name(table.game_player)),
        Phase::Play => {
            if let Some(speed_up) = &table.speed_up {
                return format!("{} asks to speed up", name(Some(speed_up.requested_by)));
            }
            match &table.trick {
                Some(trick) if trick.is_complete() => {
                    format!("{} takes the trick", name(trick_winner(trick, table)))
                }
                _ => format!("{} to play", name(table.current_player)),
            }
        }
        Phase::RoundEnd => table
            .last_result
            .as_ref()
            .map(|r| r.message())
            .unwrap_or_else(|| "Round finished".to_string()),
    }
}
