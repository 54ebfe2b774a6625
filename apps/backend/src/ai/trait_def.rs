//! AI player trait definition.

use std::fmt;

use super::context::AiContext;
use crate::domain::{Card, Game, TableAction};
use crate::error::AppError;

/// Errors that can occur during AI decision-making.
#[derive(Debug)]
pub enum AiError {
    /// AI failed to make a decision within timeout
    Timeout,
    /// AI encountered an internal error
    Internal(String),
    /// AI produced an invalid move
    InvalidMove(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Timeout => write!(f, "AI decision timeout"),
            AiError::Internal(msg) => write!(f, "AI internal error: {msg}"),
            AiError::InvalidMove(msg) => write!(f, "AI invalid move: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        AppError::internal(format!("AI error: {err}"))
    }
}

/// Whether the declarer picks up the skat or plays Hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SkatDecision {
    PickUp,
    Hand,
}

/// Trait for computer players.
///
/// Every method receives an [`AiContext`] for the seat that has to act. The
/// returned choice is checked against the table by the driver; an illegal
/// choice is treated like an error.
pub trait AiPlayer: Send + Sync {
    /// `Bid`, `Accept` or `Pass` while the seat is on turn in bidding.
    fn choose_bid_action(&self, ctx: &AiContext<'_>) -> Result<TableAction, AiError>;

    fn choose_skat_decision(&self, ctx: &AiContext<'_>) -> Result<SkatDecision, AiError>;

    /// Two cards from the 12-card hand to lay away.
    fn choose_discard(&self, ctx: &AiContext<'_>) -> Result<[Card; 2], AiError>;

    /// Game to declare; must not be overbid when avoidable.
    fn choose_game(&self, ctx: &AiContext<'_>) -> Result<Game, AiError>;

    /// Card to play. The AI should pick from `ctx.legal_plays()`.
    fn choose_card(&self, ctx: &AiContext<'_>) -> Result<Card, AiError>;

    /// `ConfirmSpeedUp` or `ContinuePlaying` for a pending speed-up request.
    fn choose_speed_up_reply(&self, ctx: &AiContext<'_>) -> Result<TableAction, AiError>;
}
