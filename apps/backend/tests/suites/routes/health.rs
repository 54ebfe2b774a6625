use actix_web::test;
use serde_json::{json, Value};

use crate::support::app_builder::create_test_app;
use crate::support::test_state::build_test_state;

#[actix_web::test]
async fn health_reports_the_table() {
    let app = create_test_app(build_test_state()).await;

    let req = test::TestRequest::post()
        .uri("/api/table/login")
        .set_json(json!({ "name": "anna" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("x-trace-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["players"], 1);
    assert!(body["table_version"].as_u64().is_some_and(|v| v > 0));
    assert!(body["app_version"].is_string());
    assert!(body["time"].is_string());
}
