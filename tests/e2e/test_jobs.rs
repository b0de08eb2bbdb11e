use crate::e2e::helpers;

use helpers::assertions::{assert_job_response, job_id};
use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

async fn create_job(ctx: &TestContext, text: &str) -> String {
    let response = ctx.client.post("/convert", &json!({"text": text})).await.unwrap();
    response.assert_status(StatusCode::OK);
    job_id(response.body.as_ref().unwrap())
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_jobs_newest_first(ctx: &TestContext) {
    let first = create_job(ctx, "The first book of the evening.").await;
    let second = create_job(ctx, "The second book of the evening.").await;

    let response = ctx.client.get("/jobs").await.unwrap();

    response.assert_status(StatusCode::OK);
    let jobs = response.body.as_ref().unwrap().as_array().unwrap().clone();
    assert_eq!(jobs.len(), 2);
    jobs.iter().for_each(assert_job_response);
    assert_eq!(job_id(&jobs[0]), second);
    assert_eq!(job_id(&jobs[1]), first);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_get_a_single_job(ctx: &TestContext) {
    let id = create_job(ctx, "A single book to look up.").await;

    let response = ctx.client.get(&format!("/jobs/{}", id)).await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_job_response(body);
    assert_eq!(job_id(body), id);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_job(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("/jobs/{}", uuid::Uuid::new_v4()))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_job_and_its_file(ctx: &TestContext) {
    let id = create_job(ctx, "A book that will be deleted.").await;
    let path = ctx.jobs.get(id.parse().unwrap()).unwrap().path;
    assert!(path.exists());

    let response = ctx.client.delete(&format!("/jobs/{}", id)).await.unwrap();

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(!path.exists());

    ctx.client
        .get(&format!("/download/{}", id))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
    ctx.client
        .delete(&format!("/jobs/{}", id))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clean_up_every_job(ctx: &TestContext) {
    let first = create_job(ctx, "One book for the cleanup.").await;
    create_job(ctx, "Another book for the cleanup.").await;

    let response = ctx.client.post_empty("/cleanup").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body,
        Some(json!({"cleaned": 2, "errors": 0, "remaining": 0}))
    );
    assert!(ctx.jobs.is_empty());

    ctx.client
        .get(&format!("/download/{}", first))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_get_for_cleanup(ctx: &TestContext) {
    create_job(ctx, "A book removed with a GET request.").await;

    let response = ctx.client.get("/cleanup").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body,
        Some(json!({"cleaned": 1, "errors": 0, "remaining": 0}))
    );

    let response = ctx.client.get("/jobs").await.unwrap();
    assert_eq!(response.body, Some(json!([])));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_count_files_already_gone(ctx: &TestContext) {
    let id = create_job(ctx, "A book whose file disappears.").await;
    let path = ctx.jobs.get(id.parse().unwrap()).unwrap().path;
    std::fs::remove_file(path).unwrap();

    let response = ctx.client.post_empty("/cleanup").await.unwrap();

    assert_eq!(
        response.body,
        Some(json!({"cleaned": 0, "errors": 0, "remaining": 0}))
    );
}
