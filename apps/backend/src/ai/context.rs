//! What a computer player sees at a decision point.
//!
//! Built from the table under the engine lock and handed to every
//! [`AiPlayer`](super::AiPlayer) method. Only information the seat could
//! legitimately know is exposed: its own hand, the open trick, the bidding
//! value and what the round memory inferred from tricks already played.

use crate::domain::bidding::next_bid_above;
use crate::domain::cards_logic::{effective_suit, winning_index, EffectiveSuit};
use crate::domain::cards_types::Card;
use crate::domain::game::{GameOptions, GameType};
use crate::domain::game_transition::TableAction;
use crate::domain::round_memory::RoundMemory;
use crate::domain::state::{Phase, Seat, Table, ACTIVE_PLAYERS};
use crate::domain::tricks::legal_moves;

pub struct AiContext<'a> {
    table: &'a Table,
    seat: Seat,
    memory: RoundMemory,
}

impl<'a> AiContext<'a> {
    pub fn new(table: &'a Table, seat: Seat) -> Self {
        Self {
            table,
            seat,
            memory: RoundMemory::from_table(table),
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn phase(&self) -> Phase {
        self.table.phase
    }

    pub fn hand(&self) -> &[Card] {
        self.table
            .players
            .get(self.seat)
            .map(|p| p.hand.as_slice())
            .unwrap_or_default()
    }

    /// Cards the declarer laid away. Empty for everyone else and in Hand
    /// games, where the skat stays unseen.
    pub fn skat(&self) -> &[Card] {
        if self.is_declarer() && self.table.skat_picked_up {
            &self.table.skat
        } else {
            &[]
        }
    }

    /// Hand plus laid-away skat: the cards matadors are counted over.
    pub fn own_cards(&self) -> Vec<Card> {
        let mut cards = self.hand().to_vec();
        cards.extend_from_slice(self.skat());
        cards
    }

    pub fn legal_plays(&self) -> Vec<Card> {
        legal_moves(self.table, self.seat)
    }

    pub fn can(&self, action: &TableAction) -> bool {
        self.table.can_apply(self.seat, action)
    }

    /// Current highest bid (0 before the first bid).
    pub fn bid_value(&self) -> u32 {
        self.table
            .bidding
            .as_ref()
            .map(|b| b.value)
            .unwrap_or(self.table.bid_value)
    }

    /// Next value this seat could bid, when it is the one making offers.
    pub fn next_bid(&self) -> Option<u32> {
        let value = next_bid_above(self.bid_value())?;
        self.can(&TableAction::Bid { value }).then_some(value)
    }

    pub fn game_type(&self) -> Option<GameType> {
        self.table.game_type
    }

    pub fn options(&self) -> GameOptions {
        self.table.options
    }

    pub fn skat_picked_up(&self) -> bool {
        self.table.skat_picked_up
    }

    pub fn declarer(&self) -> Option<Seat> {
        self.table.game_player
    }

    pub fn is_declarer(&self) -> bool {
        self.table.game_player == Some(self.seat)
    }

    /// Same side of the game: the declarer alone, or the defenders together.
    pub fn is_ally(&self, other: Seat) -> bool {
        let declarer = self.table.game_player;
        (declarer == Some(self.seat)) == (declarer == Some(other))
    }

    /// Active seats playing against this one.
    pub fn opponents(&self) -> Vec<Seat> {
        self.table
            .positions()
            .into_iter()
            .filter(|s| *s != self.seat && !self.is_ally(*s))
            .collect()
    }

    /// The other defender, when this seat defends.
    pub fn partner(&self) -> Option<Seat> {
        self.table
            .positions()
            .into_iter()
            .find(|s| *s != self.seat && self.is_ally(*s))
    }

    /// Seat acting after this one.
    pub fn next_seat(&self) -> Seat {
        self.table.next_active(self.seat)
    }

    /// Plays of the open trick so far.
    pub fn trick_plays(&self) -> &[(Seat, Card)] {
        self.table
            .trick
            .as_ref()
            .map(|t| t.plays.as_slice())
            .unwrap_or_default()
    }

    /// 0 when leading, 1 second to act, 2 last to act.
    pub fn trick_position(&self) -> usize {
        self.trick_plays().len().min(ACTIVE_PLAYERS - 1)
    }

    pub fn led_suit(&self) -> Option<EffectiveSuit> {
        let game_type = self.game_type()?;
        let (_, lead) = self.trick_plays().first()?;
        Some(effective_suit(*lead, game_type))
    }

    /// Seat and card currently winning the open trick.
    pub fn trick_winner(&self) -> Option<(Seat, Card)> {
        let game_type = self.game_type()?;
        let cards: Vec<Card> = self.trick_plays().iter().map(|(_, c)| *c).collect();
        let idx = winning_index(&cards, game_type)?;
        self.trick_plays().get(idx).copied()
    }

    pub fn memory(&self) -> &RoundMemory {
        &self.memory
    }

    /// Card points this seat's side has collected so far, skat included for
    /// the declarer.
    pub fn own_points(&self) -> u32 {
        let stitches: u32 = self
            .table
            .positions()
            .into_iter()
            .filter(|s| self.is_ally(*s))
            .filter_map(|s| self.table.players.get(s))
            .flat_map(|p| p.stitches.iter())
            .map(|c| c.points())
            .sum();
        let skat: u32 = self.skat().iter().map(|c| c.points()).sum();
        stitches + skat
    }
}
