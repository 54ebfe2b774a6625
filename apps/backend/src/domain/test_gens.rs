// Proptest generators for domain types.
// Card vectors are always drawn without duplicates from the 32-card deck.

use proptest::prelude::*;

use crate::domain::cards_types::{full_deck, Card, Rank, Suit};
use crate::domain::game::GameType;

pub fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

pub fn suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Clubs),
        Just(Suit::Spades),
        Just(Suit::Hearts),
        Just(Suit::Diamonds),
    ]
}

pub fn rank() -> impl Strategy<Value = Rank> {
    prop::sample::select(Rank::ALL.to_vec())
}

pub fn card() -> impl Strategy<Value = Card> {
    (suit(), rank()).prop_map(|(suit, rank)| Card::new(suit, rank))
}

/// Any game type, Suit games over every suit.
pub fn game_type() -> impl Strategy<Value = GameType> {
    prop_oneof![
        suit().prop_map(GameType::suit),
        Just(GameType::Grand),
        Just(GameType::Null),
    ]
}

/// `count` distinct cards in random order.
pub fn unique_cards(count: usize) -> impl Strategy<Value = Vec<Card>> {
    Just(()).prop_perturb(move |_, mut rng| {
        let mut deck = full_deck();
        for i in 0..count.min(deck.len()) {
            let j = rng.random_range(i..deck.len());
            deck.swap(i, j);
        }
        deck.truncate(count);
        deck
    })
}

/// A hand of 1..=10 cards plus a distinct lead card.
pub fn hand_and_lead() -> impl Strategy<Value = (Vec<Card>, Card)> {
    (1usize..=10).prop_flat_map(|n| {
        unique_cards(n + 1).prop_map(|mut cards| {
            let lead = cards.pop().unwrap_or(Card::new(Suit::Clubs, Rank::Seven));
            (cards, lead)
        })
    })
}

/// Per-step choices used to drive random playthroughs.
pub fn choices(len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), len)
}
