use crate::domain::cards_types::Suit;
use crate::domain::game::{Game, GameOptions, GameType};
use crate::domain::scoring::{evaluate, matadors, tournament_points, RoundEnding};
use crate::domain::test_state_helpers::cards;

fn played(points: u32, declarer_tricks: u32) -> RoundEnding {
    RoundEnding::Played {
        declarer_points: points,
        declarer_tricks,
        opponent_tricks: 10 - declarer_tricks,
    }
}

#[test]
fn matadors_with_and_without() {
    let with_two = cards("JC JS AH TH 7C 8C 9C QS KS 7D AD TD");
    let m = matadors(&with_two, GameType::Grand);
    assert!(m.with);
    assert_eq!(m.count, 2);

    let without_three = cards("JD AH TH 7C 8C 9C QS KS 7D AD TD 8H");
    let m = matadors(&without_three, GameType::Grand);
    assert!(!m.with);
    assert_eq!(m.count, 3);

    // suit game continues the run into the trump suit
    let with_six = cards("JC JS JH JD AH TH 7C 8C 9C QS 7D 8D");
    let m = matadors(&with_six, GameType::suit(Suit::Hearts));
    assert!(m.with);
    assert_eq!(m.count, 6);
}

#[test]
fn grand_hand_schneider_is_base_times_run_plus_two() {
    let declarer = cards("JC JS JH JD AC AS AH AD TC 7H 7D 8D");
    let game = Game::new(
        GameType::Grand,
        GameOptions {
            hand: true,
            schneider: true,
            ..Default::default()
        },
    );
    let r = evaluate(&game, &declarer, 18, played(112, 9));
    let run = r.matadors.count + 1;
    assert!(r.won);
    assert!(!r.schwarz);
    assert_eq!(r.value, 24 * (run + 2));
    assert_eq!(r.value, 168);
    assert_eq!(r.score, 168);
}

#[test]
fn plain_suit_game_win() {
    // Clubs with 1: (1 + 1) * 12 = 24
    let declarer = cards("JC AH TH 7C 8C 9C QS KS 7D AD TD 8H");
    let game = Game::new(GameType::suit(Suit::Clubs), GameOptions::default());
    let r = evaluate(&game, &declarer, 18, played(61, 5));
    assert!(r.won);
    assert_eq!(r.value, 24);
    assert_eq!(r.score, 24);
}

#[test]
fn sixty_points_loses_at_double_value() {
    let declarer = cards("JC AH TH 7C 8C 9C QS KS 7D AD TD 8H");
    let game = Game::new(GameType::suit(Suit::Clubs), GameOptions::default());
    let r = evaluate(&game, &declarer, 18, played(60, 5));
    assert!(!r.won);
    assert_eq!(r.score, -48);
}

#[test]
fn schneider_reached_adds_a_level() {
    let declarer = cards("JC AH TH 7C 8C 9C QS KS 7D AD TD 8H");
    let game = Game::new(GameType::suit(Suit::Clubs), GameOptions::default());
    let r = evaluate(&game, &declarer, 18, played(95, 8));
    assert!(r.schneider);
    assert_eq!(r.value, 36);
}

#[test]
fn overbid_is_lost_and_raised_to_base_multiple() {
    // Diamonds with 1 = 18, bid 20 -> smallest multiple of 9 >= 20 is 27
    let declarer = cards("JC AH TH 7C 8C 9C QS KS 7D AD TD 8H");
    let game = Game::new(GameType::suit(Suit::Diamonds), GameOptions::default());
    let r = evaluate(&game, &declarer, 20, played(80, 7));
    assert!(r.overbid);
    assert!(!r.won);
    assert_eq!(r.value, 27);
    assert_eq!(r.score, -54);
}

#[test]
fn null_values_and_outcome() {
    let declarer = cards("7C 8C 9C 7S 8S 9S 7H 8H 9H 7D JC JS");
    let null = Game::new(GameType::Null, GameOptions::default());
    let r = evaluate(&null, &declarer, 23, played(0, 0));
    assert!(r.won);
    assert_eq!(r.value, 23);

    let ouvert_hand = Game::new(
        GameType::Null,
        GameOptions {
            hand: true,
            ouvert: true,
            ..Default::default()
        },
    );
    let r = evaluate(&ouvert_hand, &declarer, 23, played(0, 1));
    assert!(!r.won);
    assert_eq!(r.value, 59);
    assert_eq!(r.score, -118);
}

#[test]
fn null_overbid_keeps_table_value() {
    let declarer = cards("7C 8C 9C 7S 8S 9S 7H 8H 9H 7D JC JS");
    let null = Game::new(GameType::Null, GameOptions::default());
    let r = evaluate(&null, &declarer, 24, played(0, 0));
    assert!(r.overbid);
    assert!(!r.won);
    assert_eq!(r.value, 23);
}

#[test]
fn give_up_loses_at_declared_value() {
    let declarer = cards("JC JS AH TH 7C 8C 9C QS KS 7D AD TD");
    let game = Game::new(GameType::Grand, GameOptions::default());
    let r = evaluate(&game, &declarer, 18, RoundEnding::GivenUp);
    assert!(r.given_up);
    assert!(!r.won);
    // Grand with 2: 24 * 3
    assert_eq!(r.value, 72);
    assert_eq!(r.score, -144);
}

#[test]
fn tournament_points_swing() {
    let declarer = cards("JC JS AH TH 7C 8C 9C QS KS 7D AD TD");
    let game = Game::new(GameType::Grand, GameOptions::default());
    let won = evaluate(&game, &declarer, 18, played(70, 6));
    assert_eq!(tournament_points(&won, 3), (72 + 50, 0));

    let lost = evaluate(&game, &declarer, 18, played(50, 4));
    assert_eq!(tournament_points(&lost, 3), (-144 - 50, 40));
    assert_eq!(tournament_points(&lost, 4), (-144 - 50, 30));
}
