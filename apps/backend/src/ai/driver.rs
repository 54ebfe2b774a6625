//! Runs computer seats until a human has to act.
//!
//! Computers never collect tricks; a finished trick waits for a human at the
//! table. A pending speed-up request is answered once by every computer seat
//! that has not replied yet.

use tracing::{debug, info, warn};

use super::context::AiContext;
use super::trait_def::{AiError, AiPlayer, SkatDecision};
use crate::domain::game::{Game, GameOptions, GameType};
use crate::domain::game_transition::TableAction;
use crate::domain::state::{Phase, Seat, Table};
use crate::domain::tricks::legal_moves;

/// Upper bound on computer moves per call; a round needs far fewer.
const MAX_MOVES: usize = 256;

/// The next action a computer seat takes at `table`, if any.
pub fn next_computer_move(table: &Table, ai: &dyn AiPlayer) -> Option<(Seat, TableAction)> {
    let seat = computer_to_act(table)?;
    let ctx = AiContext::new(table, seat);
    let decided = decide(&ctx, ai).and_then(|action| {
        if table.can_apply(seat, &action) {
            Ok(action)
        } else {
            Err(AiError::InvalidMove(format!("{action:?} rejected")))
        }
    });
    match decided {
        Ok(action) => Some((seat, action)),
        Err(e) => {
            warn!(seat, phase = ?table.phase, error = %e, "AI decision failed, using fallback");
            fallback_action(table, seat).map(|action| (seat, action))
        }
    }
}

/// Apply computer moves until a human must act or the round is over.
/// Returns the number of moves applied.
pub fn run_computer_players(table: &mut Table, ai: &dyn AiPlayer) -> usize {
    let mut moves = 0;
    while moves < MAX_MOVES {
        let Some((seat, action)) = next_computer_move(table, ai) else {
            break;
        };
        debug!(seat, ?action, "computer move");
        if !table.apply(seat, action) {
            warn!(seat, phase = ?table.phase, "computer move rejected");
            break;
        }
        moves += 1;
    }
    if moves > 0 {
        info!(moves, phase = ?table.phase, "computer players acted");
    }
    moves
}

fn computer_to_act(table: &Table) -> Option<Seat> {
    let is_computer = |s: Seat| table.players.get(s).is_some_and(|p| p.is_computer);
    if let Some(speed_up) = &table.speed_up {
        return table.positions().into_iter().find(|&s| {
            is_computer(s) && s != speed_up.requested_by && !speed_up.confirmed.contains(&s)
        });
    }
    let current = table.current_player?;
    if !is_computer(current) {
        return None;
    }
    let trick_waiting = table.trick.as_ref().is_some_and(|t| t.is_complete());
    match table.phase {
        Phase::Bidding | Phase::SkatDecision | Phase::GameDeclaration => Some(current),
        Phase::Play if !trick_waiting => Some(current),
        _ => None,
    }
}

fn decide(ctx: &AiContext<'_>, ai: &dyn AiPlayer) -> Result<TableAction, AiError> {
    if ctx.phase() == Phase::Play && ctx.can(&TableAction::ConfirmSpeedUp) {
        return ai.choose_speed_up_reply(ctx);
    }
    match ctx.phase() {
        Phase::Bidding => ai.choose_bid_action(ctx),
        Phase::SkatDecision => Ok(match ai.choose_skat_decision(ctx)? {
            SkatDecision::PickUp => TableAction::PickUpSkat,
            SkatDecision::Hand => TableAction::PlayHand,
        }),
        Phase::GameDeclaration if ctx.skat_picked_up() && ctx.hand().len() > 10 => {
            let cards = ai.choose_discard(ctx)?;
            Ok(TableAction::DiscardSkat {
                cards: cards.to_vec(),
            })
        }
        Phase::GameDeclaration => Ok(TableAction::SetGame {
            game: ai.choose_game(ctx)?,
        }),
        Phase::Play => Ok(TableAction::PlayCard {
            card: ai.choose_card(ctx)?,
        }),
        Phase::NotStarted | Phase::RoundEnd => {
            Err(AiError::Internal(format!("nothing to decide in {:?}", ctx.phase())))
        }
    }
}

/// First legal action from a fixed list; keeps the table moving when the
/// AI misbehaves.
fn fallback_action(table: &Table, seat: Seat) -> Option<TableAction> {
    let hand = table
        .players
        .get(seat)
        .map(|p| p.hand.clone())
        .unwrap_or_default();
    let mut candidates = vec![
        TableAction::ConfirmSpeedUp,
        TableAction::Pass,
        TableAction::PickUpSkat,
        TableAction::SetGame {
            game: Game::new(GameType::Grand, GameOptions::default()),
        },
    ];
    if let [first, second, ..] = hand.as_slice() {
        candidates.push(TableAction::DiscardSkat {
            cards: vec![*first, *second],
        });
    }
    candidates.extend(
        legal_moves(table, seat)
            .into_iter()
            .map(|card| TableAction::PlayCard { card }),
    );
    candidates.into_iter().find(|a| table.can_apply(seat, a))
}
