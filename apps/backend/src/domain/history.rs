//! Immutable records of completed rounds.

use serde::{Deserialize, Serialize};

use super::cards_types::Card;
use super::game::Game;
use super::scoring::GameResult;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub player: String,
    pub card: Card,
}

/// One completed round. Passed-in rounds carry no declarer and no game.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameHistory {
    /// 1-based number of the round at this table.
    pub game_number: u32,
    pub players: Vec<String>,
    pub declarer: Option<String>,
    pub game: Option<Game>,
    pub bid: u32,
    /// Skat as dealt.
    pub skat: Vec<Card>,
    /// Cards the declarer won from the opponents' plays.
    pub cards_from_opponents: Vec<Card>,
    pub play_sequence: Vec<PlayRecord>,
    /// Signed game value for the declarer; 0 for a passed-in round.
    pub value: i32,
    pub result: Option<GameResult>,
}

impl GameHistory {
    pub fn is_passed_in(&self) -> bool {
        self.game.is_none()
    }
}

/// Outcome of the last round, shown until the next one starts.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub declarer: Option<String>,
    pub game: Option<Game>,
    pub value: i32,
    pub won: bool,
    pub declarer_points: u32,
    /// Tournament score change per player name.
    pub tournament_deltas: Vec<(String, i32)>,
}

impl RoundSummary {
    /// Short result line, e.g. "Anna wins Grand Hand with 78 points (+96)".
    pub fn message(&self) -> String {
        match (&self.declarer, &self.game) {
            (Some(declarer), Some(game)) => {
                let verb = if self.won { "wins" } else { "loses" };
                format!(
                    "{declarer} {verb} {} with {} points ({:+})",
                    game.describe(),
                    self.declarer_points,
                    self.value
                )
            }
            _ => "All players passed".to_string(),
        }
    }
}
