use actix_web::test;
use futures_util::future::join_all;
use serde_json::Value;
use skat_backend::EngineConfig;

use crate::common::assert_problem_details_structure;
use crate::support::app_builder::create_test_app;
use crate::support::test_state::build_test_state_with;

#[actix_web::test]
async fn poll_returns_the_same_version_after_the_timeout() {
    let app = create_test_app(build_test_state_with(EngineConfig::for_tests())).await;
    let req = test::TestRequest::get().uri("/api/table/state").to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    let version = state["version"].as_u64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/table/state/poll?version={version}"))
        .to_request();
    let polled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(polled["version"], version);

    // a stale version answers at once
    let req = test::TestRequest::get()
        .uri(&format!("/api/table/state/poll?version={}", version + 10))
        .to_request();
    let polled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(polled["version"], version);
}

#[actix_web::test]
async fn waiters_over_the_cap_get_503() {
    let config = EngineConfig {
        long_poll_max_waiters: 2,
        ..EngineConfig::for_tests()
    };
    let app = create_test_app(build_test_state_with(config)).await;
    let req = test::TestRequest::get().uri("/api/table/state").to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    let version = state["version"].as_u64().unwrap();

    let polls = (0..3).map(|_| {
        let req = test::TestRequest::get()
            .uri(&format!("/api/table/state/poll?version={version}"))
            .to_request();
        test::call_service(&app, req)
    });
    let responses = join_all(polls).await;

    let mut rejected = Vec::new();
    let mut answered = 0;
    for resp in responses {
        match resp.status().as_u16() {
            200 => answered += 1,
            503 => rejected.push(resp),
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(answered, 2);
    assert_eq!(rejected.len(), 1);
    let problem = assert_problem_details_structure(
        rejected.pop().unwrap(),
        503,
        "TOO_MANY_WAITERS",
    )
    .await;
    assert_eq!(problem["retry_after_secs"], 1);
}
