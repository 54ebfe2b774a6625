// Property-based tests over random playthroughs of whole rounds
use proptest::prelude::*;

use crate::domain::game_transition::TableAction;
use crate::domain::state::{Phase, Table};
use crate::domain::test_gens;
use crate::domain::test_state_helpers::{drive_step, started};

const MAX_STEPS: usize = 1000;

/// Drive a round to its end, checking invariants after every step.
fn play_round(t: &mut Table, choices: &[u8]) -> Result<(), TestCaseError> {
    for step in 0..MAX_STEPS {
        let choice = choices[step % choices.len()];
        let before = t.current_player;
        let was_open_play = t.phase == Phase::Play
            && t.trick.as_ref().is_some_and(|tr| !tr.is_complete());
        if !drive_step(t, choice) {
            break;
        }
        prop_assert!(t.cards_partitioned(), "partition broken at step {}", step);
        if let Some(current) = t.current_player {
            prop_assert!(t.is_active(current));
        }
        if was_open_play && t.trick.as_ref().is_some_and(|tr| !tr.is_complete() && !tr.plays.is_empty()) {
            let prev = before.unwrap();
            prop_assert_eq!(t.current_player, Some(t.next_active(prev)));
        }
    }
    prop_assert_eq!(t.phase, Phase::RoundEnd);
    Ok(())
}

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    /// Property: every reachable state partitions the deck, the current
    /// player is always active and play moves clockwise.
    #[test]
    fn prop_random_rounds_keep_invariants(
        seed in any::<u64>(),
        players in 3usize..=4,
        choices in test_gens::choices(64),
    ) {
        let mut t = started(players, seed);
        play_round(&mut t, &choices)?;
        prop_assert_eq!(t.history.len(), 1);
        prop_assert_eq!(t.game_counter, 1);
    }

    /// Property: bid values never decrease within a round.
    #[test]
    fn prop_bid_value_monotonic(seed in any::<u64>(), choices in test_gens::choices(32)) {
        let mut t = started(3, seed);
        let mut last = 0;
        for choice in choices {
            if t.phase != Phase::Bidding || !drive_step(&mut t, choice) {
                break;
            }
            let value = t.bidding.as_ref().map(|b| b.value).unwrap_or(t.bid_value);
            prop_assert!(value >= last);
            last = value;
        }
    }

    /// Property: a rejected action stays rejected and changes nothing.
    #[test]
    fn prop_rejected_action_is_idempotent(
        seed in any::<u64>(),
        warmup in test_gens::choices(24),
        card in test_gens::card(),
    ) {
        let mut t = started(3, seed);
        for choice in warmup {
            if !drive_step(&mut t, choice) {
                break;
            }
        }
        let outsider = t.current_player.map(|c| t.next_active(c)).unwrap_or(0);
        for action in [
            TableAction::PlayCard { card },
            TableAction::Bid { value: 17 },
            TableAction::GiveUp,
            TableAction::ConfirmSpeedUp,
        ] {
            if t.can_apply(outsider, &action) {
                continue;
            }
            let before = t.clone();
            prop_assert!(!t.apply(outsider, action.clone()));
            prop_assert!(!t.apply(outsider, action));
            prop_assert_eq!(&t, &before);
        }
    }
}
