use actix_web::test;
use serde_json::{json, Value};

use crate::common::assert_problem_details_structure;
use crate::support::app_builder::create_test_app;
use crate::support::test_state::build_test_state;

#[actix_web::test]
async fn state_blob_travels_with_every_call() {
    let app = create_test_app(build_test_state()).await;

    let req = test::TestRequest::post()
        .uri("/api/computer/new")
        .set_json(json!({ "player_name": "anna" }))
        .to_request();
    let started: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(started["accepted"], true);
    assert_eq!(started["view"]["me"], "anna");
    let state = started["state"].as_str().expect("state blob").to_string();
    assert!(state
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

    let req = test::TestRequest::post()
        .uri("/api/computer/model")
        .set_json(json!({ "player_name": "anna", "state": state }))
        .to_request();
    let viewed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(viewed["state"], state.as_str());
    assert_eq!(viewed["view"], started["view"]);

    // an illegal move keeps the blob's revision
    let req = test::TestRequest::post()
        .uri("/api/computer/action")
        .set_json(json!({
            "player_name": "anna",
            "state": state,
            "action": { "type": "BID", "value": 17 },
        }))
        .to_request();
    let acted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(acted["accepted"], false);
    assert_eq!(acted["view"]["version"], started["view"]["version"]);
}

#[actix_web::test]
async fn broken_blobs_are_400() {
    let app = create_test_app(build_test_state()).await;

    let req = test::TestRequest::post()
        .uri("/api/computer/model")
        .set_json(json!({ "player_name": "anna", "state": "definitely not a game" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 400, "INVALID_STATE").await;

    let req = test::TestRequest::post()
        .uri("/api/computer/new")
        .set_json(json!({ "player_name": "Computer 1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 400, "INVALID_NAME").await;
}
