//! Deterministic card dealing logic.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::cards_types::{full_deck, Card};

pub const HAND_SIZE: usize = 10;
pub const SKAT_SIZE: usize = 2;

/// Result of dealing one round: three hands in Vorhand, Mittelhand,
/// Hinterhand order plus the two skat cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hands: [Vec<Card>; 3],
    pub skat: Vec<Card>,
}

/// Shuffle all 32 cards uniformly with a seeded ChaCha RNG and deal
/// 10/10/10 + 2. The same seed always yields the same deal.
pub fn deal(seed: u64) -> Deal {
    let mut deck = full_deck();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);

    let skat = deck.split_off(3 * HAND_SIZE);
    let third = deck.split_off(2 * HAND_SIZE);
    let second = deck.split_off(HAND_SIZE);
    Deal {
        hands: [deck, second, third],
        skat,
    }
}
