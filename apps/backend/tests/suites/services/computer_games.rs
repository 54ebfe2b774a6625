use std::sync::Arc;

use skat_backend::ai::Heuristic;
use skat_backend::domain::{Phase, TableAction};
use skat_backend::services::computer_game::{decode, ComputerGameResponse};
use skat_backend::services::ComputerGameService;

use super::driver::scripted_action;

fn service(seed: u64) -> ComputerGameService {
    ComputerGameService::new(Arc::new(Heuristic::new(Some(seed))), Some(seed))
}

fn play_round(svc: &ComputerGameService, mut res: ComputerGameResponse) -> ComputerGameResponse {
    for _ in 0..200 {
        if res.view.phase == Phase::RoundEnd {
            return res;
        }
        let action = scripted_action(&res.view)
            .unwrap_or_else(|| panic!("nothing to do in {:?}", res.view.phase));
        let next = svc.act("anna", &res.state, action).unwrap();
        assert!(next.accepted);
        assert_eq!(next.view.version, res.view.version + 1);
        res = next;
    }
    panic!("round did not finish");
}

#[test]
fn same_seed_deals_the_same_game() {
    let a = service(3).new_game("anna").unwrap();
    let b = service(3).new_game("anna").unwrap();
    assert_eq!(a.state, b.state);
    assert_eq!(a.view.hand, b.view.hand);
}

#[test]
fn state_blob_carries_the_whole_game() {
    let svc = service(8);
    let first = play_round(&svc, svc.new_game("anna").unwrap());
    let (table, revision) = decode(&first.state).unwrap();
    assert_eq!(revision, first.view.version);
    assert_eq!(table.history.len(), 1);
    assert!(table.cards_partitioned());

    // a second service instance continues from the blob alone
    let other = service(99);
    let second = other.start_next_round("anna", &first.state).unwrap();
    assert!(second.accepted);
    let second = play_round(&other, second);
    let (table, _) = decode(&second.state).unwrap();
    assert_eq!(table.history.len(), 2);
    assert_eq!(table.game_counter, 2);
}

#[test]
fn model_does_not_change_the_state() {
    let svc = service(4);
    let res = svc.new_game("anna").unwrap();
    let viewed = svc.model("anna", &res.state).unwrap();
    assert_eq!(viewed.state, res.state);
    assert_eq!(viewed.view.version, res.view.version);
    assert!(svc.model("bob", &res.state).is_err());
}

#[test]
fn tampered_blobs_are_rejected() {
    let svc = service(5);
    let res = svc.new_game("anna").unwrap();
    let mut tampered = res.state.clone();
    tampered.truncate(tampered.len() / 2);
    assert!(svc.act("anna", &tampered, TableAction::Pass).is_err());
    assert!(svc.act("anna", "", TableAction::Pass).is_err());
}
