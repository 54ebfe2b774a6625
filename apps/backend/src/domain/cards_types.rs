//! Core card-related types: Card, Rank, Suit

/// Suits in German Skat order: Clubs is highest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Suit {
    Clubs,
    Spades,
    Hearts,
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Spades, Suit::Hearts, Suit::Diamonds];

    /// Base value of a suit game.
    pub const fn base_value(self) -> u32 {
        match self {
            Suit::Clubs => 12,
            Suit::Spades => 11,
            Suit::Hearts => 10,
            Suit::Diamonds => 9,
        }
    }

    const fn index(self) -> u8 {
        match self {
            Suit::Clubs => 0,
            Suit::Spades => 1,
            Suit::Hearts => 2,
            Suit::Diamonds => 3,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Card points counted towards the 61-point threshold.
    pub const fn points(self) -> u32 {
        match self {
            Rank::Ace => 11,
            Rank::Ten => 10,
            Rank::King => 4,
            Rank::Queen => 3,
            Rank::Jack => 2,
            Rank::Nine | Rank::Eight | Rank::Seven => 0,
        }
    }

    const fn index(self) -> u8 {
        match self {
            Rank::Seven => 0,
            Rank::Eight => 1,
            Rank::Nine => 2,
            Rank::Ten => 3,
            Rank::Jack => 4,
            Rank::Queen => 5,
            Rank::King => 6,
            Rank::Ace => 7,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Fixed order number 1..=32 (Clubs 1-8 ... Diamonds 25-32, 7 lowest).
    pub const fn order(self) -> u8 {
        self.suit.index() * 8 + self.rank.index() + 1
    }

    pub const fn points(self) -> u32 {
        self.rank.points()
    }

    pub const fn is_jack(self) -> bool {
        matches!(self.rank, Rank::Jack)
    }
}

// Note: Ord on Card follows the fixed order number and is only for stable
// sorting. Trick resolution uses `cards_logic::trick_strength`.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order().cmp(&other.order())
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The full 32-card deck in order-number sequence.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(32);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}
