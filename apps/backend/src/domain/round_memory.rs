//! What every player can infer from the tricks played so far this round.
//!
//! A player who did not follow the led effective suit is void in it for the
//! rest of the round.

use std::collections::HashSet;

use super::cards_logic::{effective_suit, EffectiveSuit};
use super::cards_types::Card;
use super::state::{Seat, Table, Trick};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundMemory {
    voids: HashSet<(Seat, EffectiveSuit)>,
    played: HashSet<Card>,
}

impl RoundMemory {
    /// Replay the collected tricks and the open trick of `table`.
    pub fn from_table(table: &Table) -> Self {
        let mut memory = Self::default();
        let Some(game_type) = table.game_type else {
            return memory;
        };
        for trick in table.played_tricks.iter().chain(table.trick.iter()) {
            memory.observe(trick, |c| effective_suit(c, game_type));
        }
        memory
    }

    fn observe(&mut self, trick: &Trick, suit_of: impl Fn(Card) -> EffectiveSuit) {
        let Some(lead) = trick.lead_card() else {
            return;
        };
        let led = suit_of(lead);
        for (seat, card) in &trick.plays {
            self.played.insert(*card);
            if suit_of(*card) != led {
                self.voids.insert((*seat, led));
            }
        }
    }

    pub fn is_void(&self, seat: Seat, suit: EffectiveSuit) -> bool {
        self.voids.contains(&(seat, suit))
    }

    pub fn is_played(&self, card: Card) -> bool {
        self.played.contains(&card)
    }

    pub fn played_count(&self) -> usize {
        self.played.len()
    }
}
