use actix_web::test;
use serde_json::json;
use skat_backend::extractors::TICKET_HEADER;

use crate::common::assert_problem_details_structure;
use crate::support::app_builder::create_test_app;
use crate::support::test_state::build_test_state;

#[actix_web::test]
async fn missing_ticket_is_401_with_bearer_challenge() {
    let app = create_test_app(build_test_state()).await;
    let req = test::TestRequest::post()
        .uri("/api/table/action")
        .set_json(json!({ "type": "PASS" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 401, "INVALID_TICKET").await;
}

#[actix_web::test]
async fn unknown_ticket_is_401() {
    let app = create_test_app(build_test_state()).await;
    let req = test::TestRequest::post()
        .uri("/api/table/start")
        .insert_header((TICKET_HEADER, uuid::Uuid::new_v4().to_string()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_structure(resp, 401, "INVALID_TICKET").await;
}

#[actix_web::test]
async fn malformed_json_is_a_validation_error() {
    let app = create_test_app(build_test_state()).await;
    let req = test::TestRequest::post()
        .uri("/api/table/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let problem = assert_problem_details_structure(resp, 400, "VALIDATION_ERROR").await;
    assert_eq!(problem["title"], "Validation Error");
}

#[actix_web::test]
async fn every_response_gets_its_own_trace_id() {
    let app = create_test_app(build_test_state()).await;
    let mut seen = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post().uri("/api/table/reset").to_request();
        let resp = test::call_service(&app, req).await;
        let trace_id = resp
            .headers()
            .get("x-trace-id")
            .and_then(|v| v.to_str().ok())
            .expect("trace id header")
            .to_string();
        let problem = assert_problem_details_structure(resp, 401, "INVALID_TICKET").await;
        assert_eq!(problem["trace_id"], trace_id.as_str());
        seen.push(trace_id);
    }
    assert_ne!(seen[0], seen[1]);
}
