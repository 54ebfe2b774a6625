//! Game definition: declared game type and announced options.

use serde::{Deserialize, Serialize};

use super::cards_types::Suit;

/// Declared game type. Only suit games carry a trump suit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameType {
    Suit { suit: Suit },
    Grand,
    Null,
}

impl GameType {
    pub const fn suit(suit: Suit) -> Self {
        GameType::Suit { suit }
    }

    pub const fn is_null(self) -> bool {
        matches!(self, GameType::Null)
    }

    /// Base value for Suit/Grand games; Null games use a fixed value table.
    pub const fn base_value(self) -> u32 {
        match self {
            GameType::Suit { suit } => suit.base_value(),
            GameType::Grand => 24,
            GameType::Null => 23,
        }
    }
}

/// Settable declaration options.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameOption {
    Hand,
    Ouvert,
    Schneider,
    Schwarz,
}

/// Announced options. `schneider`/`schwarz` are announcements, not results.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct GameOptions {
    pub hand: bool,
    pub ouvert: bool,
    pub schneider: bool,
    pub schwarz: bool,
}

impl GameOptions {
    pub const fn get(&self, option: GameOption) -> bool {
        match option {
            GameOption::Hand => self.hand,
            GameOption::Ouvert => self.ouvert,
            GameOption::Schneider => self.schneider,
            GameOption::Schwarz => self.schwarz,
        }
    }

    /// Whether these options form a legal declaration for `game_type`.
    pub fn is_consistent_with(&self, game_type: GameType) -> bool {
        if game_type.is_null() {
            return !self.schneider && !self.schwarz;
        }
        if self.schwarz && !self.schneider {
            return false;
        }
        if self.schneider && !self.hand {
            return false;
        }
        if self.ouvert && !(self.hand && self.schneider && self.schwarz) {
            return false;
        }
        true
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Game {
    pub game_type: GameType,
    pub options: GameOptions,
}

impl Game {
    pub const fn new(game_type: GameType, options: GameOptions) -> Self {
        Self { game_type, options }
    }

    /// Human-readable label such as "Clubs Hand Schneider" or "Null Ouvert".
    pub fn describe(&self) -> String {
        let mut parts = vec![match self.game_type {
            GameType::Suit { suit } => format!("{suit:?}"),
            GameType::Grand => "Grand".to_string(),
            GameType::Null => "Null".to_string(),
        }];
        let opts = self.options;
        if opts.hand {
            parts.push("Hand".to_string());
        }
        if opts.schneider && !opts.ouvert {
            parts.push("Schneider".to_string());
        }
        if opts.schwarz && !opts.ouvert {
            parts.push("Schwarz".to_string());
        }
        if opts.ouvert {
            parts.push("Ouvert".to_string());
        }
        parts.join(" ")
    }
}
