//! Domain layer: pure game logic types and helpers.

pub mod bidding;
pub mod capabilities;
pub mod cards_logic;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod dealing;
pub mod game;
pub mod game_transition;
pub mod history;
pub mod player_view;
pub mod round_memory;
pub mod scoring;
pub mod state;
pub mod tricks;

#[cfg(test)]
pub(crate) mod test_gens;
#[cfg(test)]
pub(crate) mod test_state_helpers;
#[cfg(test)]
mod tests_game_transition;
#[cfg(test)]
mod tests_props_legality;
#[cfg(test)]
mod tests_props_table;
#[cfg(test)]
mod tests_scoring;

// Re-exports for ergonomics
pub use bidding::{BidStatus, BID_LADDER};
pub use capabilities::Capabilities;
pub use cards_types::{Card, Rank, Suit};
pub use game::{Game, GameOption, GameOptions, GameType};
pub use game_transition::TableAction;
pub use history::GameHistory;
pub use player_view::PlayerView;
pub use round_memory::RoundMemory;
pub use state::{Phase, Seat, Table};
