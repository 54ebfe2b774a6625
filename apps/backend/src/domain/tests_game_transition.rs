use crate::domain::game::{Game, GameOption, GameOptions, GameType};
use crate::domain::game_transition::TableAction;
use crate::domain::state::{Phase, Table};
use crate::domain::test_state_helpers::{cards, grand, rig, started};
use crate::domain::tricks::legal_moves;

// dealer 0: Vorhand 1, Mittelhand 2, Hinterhand 0
const VH: usize = 1;
const MH: usize = 2;
const HH: usize = 0;

/// Vorhand becomes declarer at 18 after both others pass.
fn vorhand_declares(t: &mut Table) {
    assert!(t.apply(MH, TableAction::Pass));
    assert!(t.apply(HH, TableAction::Pass));
    assert!(t.apply(VH, TableAction::Bid { value: 18 }));
    assert_eq!(t.game_player, Some(VH));
}

/// Play the round out: the declarer follows `script`, everyone else plays
/// their lowest legal card; every trick is collected by its winner.
fn play_out(t: &mut Table, script: &[&str]) {
    let mut script = script.iter();
    while t.phase == Phase::Play {
        let seat = t.current_player.expect("someone acts during play");
        assert!(t.is_active(seat));
        if t.trick.as_ref().is_some_and(|tr| tr.is_complete()) {
            assert!(t.apply(seat, TableAction::CollectStitch));
            continue;
        }
        let card = if Some(seat) == t.game_player {
            script.next().expect("script long enough").parse().unwrap()
        } else {
            legal_moves(t, seat)[0]
        };
        assert!(t.apply(seat, TableAction::PlayCard { card }), "{card} by {seat}");
        assert!(t.cards_partitioned());
        if t.trick.as_ref().is_some_and(|tr| !tr.is_complete()) {
            assert_eq!(t.current_player, Some(t.next_active(seat)));
        }
    }
}

#[test]
fn grand_hand_schneider_scores_base_times_run_plus_two() {
    let mut t = started(3, 1);
    rig(
        &mut t,
        &[
            (VH, "JC JS JH JD AC AS AH AD TC 7H"),
            (MH, "8H 9H TH QH KH 7C 8C 9C QC KC"),
            (HH, "7S 8S 9S TS QS KS 9D TD QD KD"),
        ],
        "7D 8D",
    );
    assert!(t.cards_partitioned());
    vorhand_declares(&mut t);
    assert!(t.apply(VH, TableAction::PlayHand));
    assert!(t.apply(
        VH,
        grand(GameOptions {
            schneider: true,
            ..Default::default()
        })
    ));
    assert_eq!(t.phase, Phase::Play);
    assert_eq!(t.current_player, Some(VH));

    play_out(
        &mut t,
        &["JC", "JS", "JH", "JD", "AC", "AS", "AH", "AD", "TC", "7H"],
    );

    assert_eq!(t.phase, Phase::RoundEnd);
    assert_eq!(t.history.len(), 1);
    let result = t.history[0].result.clone().expect("scored game");
    assert!(result.won);
    assert_eq!(result.declarer_points, 112);
    assert_eq!(result.matadors.count, 4);
    assert_eq!(result.value, 24 * ((result.matadors.count + 1) + 2));
    assert_eq!(t.history[0].value, 168);
    assert_eq!(t.players[VH].tournament_score, 168 + 50);
    assert_eq!(t.players[MH].tournament_score, 0);
    assert_eq!(t.history[0].play_sequence.len(), 30);
}

#[test]
fn null_ends_when_declarer_takes_a_trick() {
    let mut t = started(3, 1);
    rig(
        &mut t,
        &[
            (VH, "AC 7S 8S 9S 7H 8H 9H 7D 8D 9D"),
            (MH, "7C 8C 9C TC JC QC KC TS JS QS"),
            (HH, "KS AS TH JH QH KH AH TD JD QD"),
        ],
        "KD AD",
    );
    vorhand_declares(&mut t);
    assert!(t.apply(VH, TableAction::PlayHand));
    assert!(t.apply(
        VH,
        TableAction::SetGame {
            game: Game::new(GameType::Null, GameOptions::default()),
        }
    ));
    let ac = "AC".parse().unwrap();
    assert!(t.apply(VH, TableAction::PlayCard { card: ac }));
    let mh_card = legal_moves(&t, MH)[0];
    assert!(t.apply(MH, TableAction::PlayCard { card: mh_card }));
    let hh_card = legal_moves(&t, HH)[0];
    assert!(t.apply(HH, TableAction::PlayCard { card: hh_card }));

    // only the winner may collect
    assert!(!t.apply(MH, TableAction::CollectStitch));
    assert!(t.apply(VH, TableAction::CollectStitch));

    assert_eq!(t.phase, Phase::RoundEnd);
    // Null Hand = 35, lost
    assert_eq!(t.history[0].value, -70);
    assert_eq!(t.players[VH].tournament_score, -70 - 50);
    assert_eq!(t.players[MH].tournament_score, 40);
    assert_eq!(t.players[HH].tournament_score, 40);
    assert!(t.cards_partitioned());
}

#[test]
fn speed_up_resolves_remaining_tricks_once_all_confirm() {
    let mut t = started(3, 21);
    assert!(t.apply(MH, TableAction::Bid { value: 18 }));
    assert!(t.apply(VH, TableAction::Pass));
    assert!(t.apply(HH, TableAction::Pass));
    assert_eq!(t.game_player, Some(MH));
    assert!(t.apply(MH, TableAction::PickUpSkat));
    let hand = t.players[MH].hand.clone();
    assert!(t.apply(
        MH,
        TableAction::DiscardSkat {
            cards: vec![hand[0], hand[1]],
        }
    ));
    assert!(t.apply(MH, grand(GameOptions::default())));
    let lead = legal_moves(&t, VH)[0];
    assert!(t.apply(VH, TableAction::PlayCard { card: lead }));

    assert!(t.apply(HH, TableAction::RequestSpeedUp));
    assert!(!t.apply(HH, TableAction::ConfirmSpeedUp), "requester cannot confirm");
    assert!(t.apply(VH, TableAction::ConfirmSpeedUp));
    assert_eq!(t.phase, Phase::Play, "still waiting for Mittelhand");
    let next = legal_moves(&t, MH);
    assert!(!next.is_empty());
    assert!(!t.apply(MH, TableAction::PlayCard { card: next[0] }));

    let mut twin = t.clone();
    assert!(t.apply(MH, TableAction::ConfirmSpeedUp));
    assert!(twin.apply(MH, TableAction::ConfirmSpeedUp));

    assert_eq!(t.phase, Phase::RoundEnd);
    assert!(t.is_speed_up);
    assert_eq!(t.history.len(), 1);
    assert_eq!(t.played_tricks.len(), 10);
    assert!(t.players.iter().all(|p| p.hand.is_empty()));
    assert!(t.cards_partitioned());
    assert_eq!(t, twin, "auto-resolution is deterministic");
}

#[test]
fn continue_playing_withdraws_speed_up() {
    let mut t = started(3, 21);
    vorhand_declares(&mut t);
    assert!(t.apply(VH, TableAction::PlayHand));
    assert!(t.apply(VH, grand(GameOptions::default())));
    assert!(t.apply(VH, TableAction::RequestSpeedUp));
    assert!(!t.apply(VH, TableAction::RequestSpeedUp));
    assert!(t.apply(MH, TableAction::ContinuePlaying));
    assert!(t.speed_up.is_none());
    assert!(t.apply(VH, TableAction::RequestSpeedUp));
    assert!(t.apply(VH, TableAction::CancelSpeedUp));
    assert!(t.speed_up.is_none());
    assert_eq!(t.phase, Phase::Play);
}

#[test]
fn give_up_is_a_loss_for_the_declarer_only() {
    let mut t = started(3, 8);
    vorhand_declares(&mut t);
    assert!(t.apply(VH, TableAction::PlayHand));
    assert!(t.apply(VH, grand(GameOptions::default())));
    assert!(!t.apply(MH, TableAction::GiveUp));
    assert!(t.apply(VH, TableAction::GiveUp));
    assert_eq!(t.phase, Phase::RoundEnd);
    let result = t.history[0].result.clone().expect("scored");
    assert!(result.given_up);
    assert!(!result.won);
    assert!(t.history[0].value < 0);
    assert!(t.cards_partitioned());
}

#[test]
fn announcements_follow_hand_and_first_card() {
    let mut t = started(3, 4);
    vorhand_declares(&mut t);
    assert!(t.apply(VH, TableAction::PickUpSkat));
    // Schneider can only be announced in a Hand game
    assert!(!t.apply(
        VH,
        TableAction::SetOption {
            option: GameOption::Schneider,
            value: true,
        }
    ));
    // no SetGame before discarding
    assert!(!t.apply(VH, grand(GameOptions::default())));

    let mut t = started(3, 4);
    vorhand_declares(&mut t);
    assert!(t.apply(VH, TableAction::PlayHand));
    assert!(t.apply(VH, grand(GameOptions::default())));
    assert!(t.apply(
        VH,
        TableAction::SetOption {
            option: GameOption::Ouvert,
            value: true,
        }
    ));
    assert!(t.options.schneider && t.options.schwarz && t.options.ouvert);
    assert!(!t.apply(
        MH,
        TableAction::SetOption {
            option: GameOption::Schwarz,
            value: false,
        }
    ));

    let lead = legal_moves(&t, VH)[0];
    assert!(t.apply(VH, TableAction::PlayCard { card: lead }));
    assert!(!t.apply(
        VH,
        TableAction::SetOption {
            option: GameOption::Schwarz,
            value: false,
        }
    ));
    assert!(!t.apply(
        VH,
        TableAction::SetGame {
            game: Game::new(GameType::Null, GameOptions::default()),
        }
    ));
}

#[test]
fn discard_puts_two_cards_into_skat() {
    let mut t = started(3, 4);
    vorhand_declares(&mut t);
    assert!(t.apply(VH, TableAction::PickUpSkat));
    assert_eq!(t.players[VH].hand.len(), 12);
    let hand = t.players[VH].hand.clone();
    assert!(!t.apply(
        VH,
        TableAction::DiscardSkat {
            cards: vec![hand[0], hand[0]],
        }
    ));
    assert!(t.apply(
        VH,
        TableAction::DiscardSkat {
            cards: vec![hand[2], hand[5]],
        }
    ));
    assert_eq!(t.players[VH].hand.len(), 10);
    assert_eq!(t.skat, vec![hand[2], hand[5]]);
    assert!(t.cards_partitioned());
    assert!(t.apply(VH, grand(GameOptions::default())));
    assert!(!t.options.hand);
}

#[test]
fn dealer_rotates_with_game_counter() {
    let mut t = started(3, 2);
    assert_eq!(t.dealer, 0);
    assert!(t.apply(MH, TableAction::Pass));
    assert!(t.apply(HH, TableAction::Pass));
    assert!(t.apply(VH, TableAction::Pass));
    assert!(t.start_round(3));
    assert_eq!(t.dealer, 1);
    assert_eq!(t.vorhand(), 2);
    assert_eq!(t.current_player, Some(0));
}

#[test]
fn removing_a_player_aborts_the_round() {
    let mut t = started(3, 2);
    assert!(t.apply(MH, TableAction::Bid { value: 18 }));
    assert!(t.remove_player(HH).is_some());
    assert_eq!(t.phase, Phase::NotStarted);
    assert!(t.all_cards().is_empty());
    assert!(t.cards_partitioned());
    assert_eq!(t.players.len(), 2);
    assert!(!t.can_start_round());
}

#[test]
fn skat_counts_for_the_declarer_in_hand_games() {
    let mut t = started(3, 1);
    rig(
        &mut t,
        &[
            (VH, "JC JS JH JD AC AS AH AD TC 7H"),
            (MH, "8H 9H QH KH 7C 8C 9C QC KC 7D"),
            (HH, "7S 8S 9S TS QS KS 9D 8D QD KD"),
        ],
        "TH TD",
    );
    vorhand_declares(&mut t);
    assert!(t.apply(VH, TableAction::PlayHand));
    assert!(t.apply(VH, grand(GameOptions::default())));
    let skat = cards("TH TD");
    assert_eq!(t.skat, skat);
    play_out(
        &mut t,
        &["JC", "JS", "JH", "JD", "AC", "AS", "AH", "AD", "TC", "7H"],
    );
    let result = t.history[0].result.clone().expect("scored");
    assert!(result.declarer_points >= 20);
    assert!(result.won);
}
