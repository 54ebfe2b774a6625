//! Card game logic: effective suits, trick ordering and follow-suit legality.

use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank, Suit};
use super::game::GameType;

/// The suit-group a card belongs to once the game type is known.
/// In Suit and Grand games all Jacks join the trump group.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectiveSuit {
    Trump,
    Plain(Suit),
}

pub fn is_trump(card: Card, game_type: GameType) -> bool {
    match game_type {
        GameType::Null => false,
        GameType::Grand => card.is_jack(),
        GameType::Suit { suit } => card.is_jack() || card.suit == suit,
    }
}

pub fn effective_suit(card: Card, game_type: GameType) -> EffectiveSuit {
    if is_trump(card, game_type) {
        EffectiveSuit::Trump
    } else {
        EffectiveSuit::Plain(card.suit)
    }
}

const fn jack_rank(suit: Suit) -> u8 {
    match suit {
        Suit::Clubs => 4,
        Suit::Spades => 3,
        Suit::Hearts => 2,
        Suit::Diamonds => 1,
    }
}

/// Strength of a card within its effective suit; higher wins.
///
/// Trump: Jacks (C > S > H > D) above A > 10 > K > Q > 9 > 8 > 7.
/// Plain suits in Suit/Grand: A > 10 > K > Q > 9 > 8 > 7.
/// Null: A > K > Q > J > 10 > 9 > 8 > 7.
pub fn trick_strength(card: Card, game_type: GameType) -> u8 {
    if game_type.is_null() {
        return match card.rank {
            Rank::Seven => 1,
            Rank::Eight => 2,
            Rank::Nine => 3,
            Rank::Ten => 4,
            Rank::Jack => 5,
            Rank::Queen => 6,
            Rank::King => 7,
            Rank::Ace => 8,
        };
    }
    let plain = match card.rank {
        Rank::Seven => 1,
        Rank::Eight => 2,
        Rank::Nine => 3,
        Rank::Queen => 4,
        Rank::King => 5,
        Rank::Ten => 6,
        Rank::Ace => 7,
        Rank::Jack => return 20 + jack_rank(card.suit),
    };
    if is_trump(card, game_type) {
        10 + plain
    } else {
        plain
    }
}

/// Whether `a` beats `b` in a trick led with effective suit `lead`.
pub fn card_beats(a: Card, b: Card, lead: EffectiveSuit, game_type: GameType) -> bool {
    let a_eff = effective_suit(a, game_type);
    let b_eff = effective_suit(b, game_type);
    let a_trump = a_eff == EffectiveSuit::Trump;
    let b_trump = b_eff == EffectiveSuit::Trump;
    if a_trump != b_trump {
        return a_trump;
    }
    if a_trump {
        return trick_strength(a, game_type) > trick_strength(b, game_type);
    }
    let a_follows = a_eff == lead;
    let b_follows = b_eff == lead;
    if a_follows != b_follows {
        return a_follows;
    }
    a_follows && trick_strength(a, game_type) > trick_strength(b, game_type)
}

/// Index into `cards` of the winning card; `cards[0]` is the lead.
pub fn winning_index(cards: &[Card], game_type: GameType) -> Option<usize> {
    let lead = effective_suit(*cards.first()?, game_type);
    let mut best = 0;
    for (i, card) in cards.iter().enumerate().skip(1) {
        if card_beats(*card, cards[best], lead, game_type) {
            best = i;
        }
    }
    Some(best)
}

pub fn hand_has_effective_suit(hand: &[Card], suit: EffectiveSuit, game_type: GameType) -> bool {
    hand.iter().any(|c| effective_suit(*c, game_type) == suit)
}

/// Legal cards for a hand given the lead card of the current trick.
///
/// Leading: any card. Following: cards of the led effective suit when held,
/// otherwise the whole hand. Never empty for a non-empty hand.
pub fn playable_cards(hand: &[Card], lead: Option<Card>, game_type: GameType) -> Vec<Card> {
    if let Some(lead) = lead {
        let suit = effective_suit(lead, game_type);
        if hand_has_effective_suit(hand, suit, game_type) {
            return hand
                .iter()
                .copied()
                .filter(|c| effective_suit(*c, game_type) == suit)
                .collect();
        }
    }
    hand.to_vec()
}

/// Sort a hand for display: trumps first (strongest first), then plain suits
/// in Clubs, Spades, Hearts, Diamonds order.
pub fn sort_hand(hand: &mut [Card], game_type: Option<GameType>) {
    let game_type = game_type.unwrap_or(GameType::Grand);
    hand.sort_by_key(|c| {
        let group = match effective_suit(*c, game_type) {
            EffectiveSuit::Trump => 0,
            EffectiveSuit::Plain(s) => 1 + s as u8,
        };
        (group, std::cmp::Reverse(trick_strength(*c, game_type)))
    });
}
