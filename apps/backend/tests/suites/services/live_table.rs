use std::sync::Arc;
use std::time::Duration;

use skat_backend::domain::{GameType, Phase, TableAction};
use skat_backend::EngineConfig;
use skat_backend::TableEngine;
use uuid::Uuid;

use super::driver::step;
use crate::support::test_state::{build_engine, login};

async fn seat_three(engine: &TableEngine) -> Vec<Uuid> {
    let mut tickets = Vec::new();
    for name in ["anna", "bob", "carl"] {
        tickets.push(login(engine, name).await);
    }
    tickets
}

async fn start_round(engine: &TableEngine, tickets: &[Uuid]) {
    for ticket in tickets {
        assert!(engine.start_new_round(ticket).await.unwrap());
    }
    assert_eq!(engine.snapshot().phase, Phase::Bidding);
}

async fn play_until_round_end(engine: &TableEngine, tickets: &[Uuid]) {
    for _ in 0..200 {
        if engine.snapshot().phase == Phase::RoundEnd {
            return;
        }
        assert!(step(engine, tickets).await, "nobody could act");
    }
    panic!("round did not finish");
}

#[tokio::test]
async fn three_humans_play_a_grand_hand_to_the_end() {
    let h = build_engine(EngineConfig::for_tests());
    let e = h.engine.as_ref();
    let tickets = seat_three(e).await;
    start_round(e, &tickets).await;
    play_until_round_end(e, &tickets).await;

    let table = e.snapshot();
    assert!(table.cards_partitioned());
    assert_eq!(table.history.len(), 1);
    let round = &table.history[0];
    assert_eq!(round.bid, 18);
    let game = round.game.expect("a game was declared");
    assert_eq!(game.game_type, GameType::Grand);
    assert!(game.options.hand);
    assert_ne!(round.value, 0);

    for ticket in &tickets {
        let view = e.model(Some(ticket)).unwrap();
        assert_eq!(view.phase, Phase::RoundEnd);
        assert!(view.last_result.is_some());
        assert!(view.capabilities.can_start_new_game);
    }

    assert_eq!(h.results.len(), 1);
    let row = h.results.get(1).expect("result row");
    assert_eq!(row.players, vec!["anna", "bob", "carl"]);
    assert_eq!(row.history.len(), 1);
    assert!(row.ended_utc.is_some());
}

#[tokio::test]
async fn consecutive_rounds_share_one_result_row() {
    let h = build_engine(EngineConfig::for_tests());
    let e = h.engine.as_ref();
    let tickets = seat_three(e).await;
    for round in 1..=2 {
        start_round(e, &tickets).await;
        play_until_round_end(e, &tickets).await;
        assert_eq!(h.results.len(), 1);
        assert_eq!(h.results.get(1).unwrap().history.len(), round);
    }

    // a reset starts a new table generation and a new row
    e.reset(&tickets[0]).await.unwrap();
    assert!(e.players().is_empty());
    let tickets = seat_three(e).await;
    start_round(e, &tickets).await;
    play_until_round_end(e, &tickets).await;
    assert_eq!(h.results.len(), 2);
    assert_eq!(h.results.get(2).unwrap().history.len(), 1);
}

#[tokio::test]
async fn confirmed_speed_up_plays_out_the_round() {
    let h = build_engine(EngineConfig::for_tests());
    let e = h.engine.as_ref();
    let tickets = seat_three(e).await;
    start_round(e, &tickets).await;

    for _ in 0..20 {
        if e.snapshot().phase == Phase::Play {
            break;
        }
        assert!(step(e, &tickets).await);
    }
    let requester = *tickets
        .iter()
        .find(|t| e.model(Some(*t)).unwrap().capabilities.can_request_speed_up)
        .expect("someone may ask to speed up");
    assert!(e.act(&requester, TableAction::RequestSpeedUp).await.unwrap());

    let view = e.model(Some(&requester)).unwrap();
    assert!(view.speed_up.is_some());
    assert!(!view.capabilities.can_play_card);

    for ticket in tickets.iter().filter(|t| **t != requester) {
        assert!(e.act(ticket, TableAction::ConfirmSpeedUp).await.unwrap());
    }
    let table = e.snapshot();
    assert_eq!(table.phase, Phase::RoundEnd);
    assert!(table.is_speed_up);
    assert!(table.cards_partitioned());
    assert_eq!(h.results.get(1).unwrap().history.len(), 1);
}

#[tokio::test]
async fn cancelled_speed_up_resumes_play() {
    let h = build_engine(EngineConfig::for_tests());
    let e = h.engine.as_ref();
    let tickets = seat_three(e).await;
    start_round(e, &tickets).await;
    while e.snapshot().phase != Phase::Play {
        assert!(step(e, &tickets).await);
    }
    let requester = *tickets
        .iter()
        .find(|t| e.model(Some(*t)).unwrap().capabilities.can_request_speed_up)
        .unwrap();
    assert!(e.act(&requester, TableAction::RequestSpeedUp).await.unwrap());
    assert!(e.act(&requester, TableAction::CancelSpeedUp).await.unwrap());

    let table = e.snapshot();
    assert!(table.speed_up.is_none());
    assert!(!table.is_speed_up);
    play_until_round_end(e, &tickets).await;
}

#[tokio::test]
async fn long_poll_wakes_on_login() {
    let h = build_engine(EngineConfig::for_tests());
    let engine = Arc::clone(&h.engine);
    let seen = engine.state();
    let waiter = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.long_poll(seen).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    login(&engine, "anna").await;

    let version = waiter.await.unwrap().unwrap();
    assert!(version > seen);
    assert_eq!(version, engine.state());
}

#[tokio::test]
async fn long_poll_times_out_with_the_same_version() {
    let h = build_engine(EngineConfig::for_tests());
    let seen = h.engine.state();
    assert_eq!(h.engine.long_poll(seen).await.unwrap(), seen);
}

#[tokio::test]
async fn computer_opponents_fill_the_table() {
    let h = build_engine(EngineConfig::for_tests());
    let e = h.engine.as_ref();
    let anna = login(e, "anna").await;
    assert_eq!(e.add_computer_player(&anna).unwrap(), "Computer 1");
    assert_eq!(e.add_computer_player(&anna).unwrap(), "Computer 2");

    // computers count as confirmed
    assert!(e.start_new_round(&anna).await.unwrap());
    assert!(e.snapshot().is_round_in_progress());
    for _ in 0..200 {
        if e.snapshot().phase == Phase::RoundEnd {
            break;
        }
        assert!(step(e, &[anna]).await, "anna has nothing to do");
    }
    assert_eq!(e.snapshot().phase, Phase::RoundEnd);

    // the last human leaving wipes the table
    e.logout(&anna).await.unwrap();
    assert!(e.players().is_empty());
}
