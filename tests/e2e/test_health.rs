use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ready_status(ctx: &TestContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("ready"));
    assert_eq!(body.get("storage").and_then(|v| v.as_str()), Some("writable"));
    assert_eq!(body.get("tts").and_then(|v| v.as_str()), Some("tone"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_responses(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = ctx.client.get("/jobs/not-a-uuid").await.unwrap();
    response.assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_status_with_active_files(ctx: &TestContext) {
    let response = ctx.client.get("/status").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("online"));
    assert_eq!(body.get("tts_backend").and_then(|v| v.as_str()), Some("tone"));
    assert_eq!(body.get("active_files").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(
        body.get("storage_dir").and_then(|v| v.as_str()),
        Some(ctx.store.root().display().to_string().as_str())
    );
    assert!(body.get("timestamp").is_some());

    ctx.client
        .post("/convert", &json!({"text": "A short text to count."}))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.get("/status").await.unwrap();
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("active_files").and_then(|v| v.as_u64()), Some(1));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_handle_concurrent_health_checks(ctx: &TestContext) {
    let mut futures = Vec::new();
    for _ in 0..10 {
        let client = ctx.client.clone();
        futures.push(async move { client.get("/health").await });
    }

    let results = futures::future::join_all(futures).await;

    for result in results {
        let response = result.unwrap();
        response.assert_status(StatusCode::OK);
    }
}
