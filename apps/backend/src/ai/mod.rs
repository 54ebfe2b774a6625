//! Computer players.
//!
//! This module provides:
//! - the [`AiPlayer`] trait every computer strategy implements
//! - [`Heuristic`], the default strategy (seedable for tests)
//! - the driver that lets computer seats act at a table

mod context;
mod driver;
mod heuristic;
mod trait_def;

pub use context::AiContext;
pub use driver::{next_computer_move, run_computer_players};
pub use heuristic::Heuristic;
pub use trait_def::{AiError, AiPlayer, SkatDecision};

/// Create an AI player by name.
///
/// Currently supports:
/// - "heuristic": [`Heuristic`] with an optional tie-break seed
///
/// Returns None if `ai_type` is unrecognized.
pub fn create_ai(ai_type: &str, seed: Option<u64>) -> Option<Box<dyn AiPlayer>> {
    match ai_type {
        "heuristic" => Some(Box::new(Heuristic::new(seed))),
        _ => None,
    }
}
