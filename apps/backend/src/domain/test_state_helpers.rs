// Test-only helpers for building tables and driving rounds.

use crate::domain::bidding::next_bid_above;
use crate::domain::cards_parsing::try_parse_cards;
use crate::domain::cards_types::Card;
use crate::domain::game::{Game, GameOptions, GameType};
use crate::domain::game_transition::TableAction;
use crate::domain::state::{Phase, Seat, Table};
use crate::domain::tricks::legal_moves;

pub fn cards(s: &str) -> Vec<Card> {
    try_parse_cards(s.split_whitespace()).expect("test cards")
}

/// Table with `n` human players named p0, p1, ...
pub fn seated(n: usize) -> Table {
    let mut table = Table::new();
    for i in 0..n {
        table.add_player(format!("p{i}"), false);
    }
    table
}

/// Table with `n` players and a freshly dealt round.
pub fn started(n: usize, seed: u64) -> Table {
    let mut table = seated(n);
    assert!(table.start_round(seed));
    table
}

/// Replace the dealt cards of a round still in bidding.
pub fn rig(table: &mut Table, hands: &[(Seat, &str)], skat: &str) {
    for (seat, hand) in hands {
        table.players[*seat].hand = cards(hand);
    }
    table.skat = cards(skat);
    table.original_skat = table.skat.clone();
}

pub fn grand(options: GameOptions) -> TableAction {
    TableAction::SetGame {
        game: Game::new(GameType::Grand, options),
    }
}

/// Apply one legal action for whoever must act, steered by `choice`.
/// Returns false when nobody can act.
pub fn drive_step(table: &mut Table, choice: u8) -> bool {
    let Some(seat) = table.current_player else {
        return false;
    };
    let action = match table.phase {
        Phase::Bidding => {
            let value = table.bidding.as_ref().map(|b| b.value).unwrap_or(0);
            let candidates = [
                next_bid_above(value).map(|v| TableAction::Bid { value: v }),
                Some(TableAction::Accept),
                Some(TableAction::Pass),
            ];
            let legal: Vec<TableAction> = candidates
                .into_iter()
                .flatten()
                .filter(|a| table.can_apply(seat, a))
                .collect();
            if legal.is_empty() {
                return false;
            }
            legal[choice as usize % legal.len()].clone()
        }
        Phase::SkatDecision => {
            if choice % 2 == 0 {
                TableAction::PickUpSkat
            } else {
                TableAction::PlayHand
            }
        }
        Phase::GameDeclaration => {
            if table.skat_picked_up && table.skat.is_empty() {
                let hand = &table.players[seat].hand;
                TableAction::DiscardSkat {
                    cards: vec![hand[0], hand[1]],
                }
            } else {
                let game_type = match choice % 3 {
                    0 => GameType::Grand,
                    1 => GameType::Null,
                    _ => GameType::suit(table.players[seat].hand[0].suit),
                };
                TableAction::SetGame {
                    game: Game::new(game_type, GameOptions::default()),
                }
            }
        }
        Phase::Play => {
            if table.trick.as_ref().is_some_and(|t| t.is_complete()) {
                TableAction::CollectStitch
            } else {
                let legal = legal_moves(table, seat);
                if legal.is_empty() {
                    return false;
                }
                TableAction::PlayCard {
                    card: legal[choice as usize % legal.len()],
                }
            }
        }
        Phase::NotStarted | Phase::RoundEnd => return false,
    };
    table.apply(seat, action)
}
