use crate::e2e::helpers;

use helpers::api_client::FormPart;
use helpers::assertions::{assert_job_response, job_id};
use helpers::{TestContext, FAIL_MARKER, TEST_MAX_UPLOAD_BYTES};
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

const ENGLISH_TEXT: &str =
    "The quick brown fox jumps over the lazy dog while the farmer watches from the porch.";

fn staged_files(ctx: &TestContext) -> usize {
    std::fs::read_dir(ctx.store.root().join("staging"))
        .unwrap()
        .count()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_convert_text_and_serve_the_audio(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/convert", &json!({"text": ENGLISH_TEXT}))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_job_response(body);
    assert_eq!(body.get("voice").and_then(|v| v.as_str()), Some("tone-en"));
    assert_eq!(body.get("language").and_then(|v| v.as_str()), Some("en"));
    assert_eq!(
        body.get("text_length").and_then(|v| v.as_u64()),
        Some(ENGLISH_TEXT.chars().count() as u64)
    );

    let id = job_id(body);
    let download = ctx.client.get(&format!("/download/{}", id)).await.unwrap();

    download
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/wav")
        .assert_header(
            "content-disposition",
            &format!("attachment; filename=\"audiobook_{}.wav\"", id),
        );
    assert_eq!(&download.body_bytes[..4], b"RIFF");
    assert_eq!(
        download.body_bytes.len() as u64,
        body.get("size_bytes").and_then(|v| v.as_u64()).unwrap()
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clamp_speed_and_honor_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/convert",
            &json!({"text": ENGLISH_TEXT, "voice": "tone-es", "speed": 9.0}),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("voice").and_then(|v| v.as_str()), Some("tone-es"));
    assert_eq!(body.get("speed").and_then(|v| v.as_f64()), Some(2.0));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_and_short_text(ctx: &TestContext) {
    for text in ["", "   ", "Hi"] {
        let response = ctx
            .client
            .post("/convert", &json!({"text": text}))
            .await
            .unwrap();

        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error_message("Text");
    }

    assert!(ctx.jobs.is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_failed_chunks(ctx: &TestContext) {
    let good = "This first paragraph is long enough to need a chunk of its own. ".repeat(2);
    let bad = format!("{} {}", FAIL_MARKER, "The second paragraph will be rejected. ".repeat(3));
    let text = format!("{}\n\n{}", good.trim(), bad.trim());

    let response = ctx.client.post("/convert", &json!({"text": text})).await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("chunk_count").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(body.get("skipped_chunks"), Some(&json!([1])));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_when_every_chunk_fails(ctx: &TestContext) {
    let text = format!("{} nothing here can be spoken.", FAIL_MARKER);

    let response = ctx.client.post("/convert", &json!({"text": text})).await.unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("tone engine rejected the chunk");
    assert!(ctx.jobs.is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_convert_form_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post_form(
            "/convert-form",
            &[
                FormPart::Text("text", ENGLISH_TEXT),
                FormPart::Text("voice", ""),
                FormPart::Text("speed", "1.5"),
            ],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_job_response(body);
    assert_eq!(body.get("speed").and_then(|v| v.as_f64()), Some(1.5));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_convert_an_uploaded_document(ctx: &TestContext) {
    let response = ctx
        .client
        .post_form(
            "/convert-form",
            &[FormPart::File {
                name: "file",
                filename: "notes.txt",
                bytes: ENGLISH_TEXT.as_bytes(),
            }],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_job_response(body);
    assert_eq!(
        body.get("text_length").and_then(|v| v.as_u64()),
        Some(ENGLISH_TEXT.chars().count() as u64)
    );
    assert_eq!(staged_files(ctx), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_prefer_form_text_over_file(ctx: &TestContext) {
    let response = ctx
        .client
        .post_form(
            "/convert-form",
            &[
                FormPart::File {
                    name: "file",
                    filename: "ignored.txt",
                    bytes: b"This file content is never read.",
                },
                FormPart::Text("text", "Form text wins."),
            ],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("text_length").and_then(|v| v.as_u64()), Some(15));
    assert_eq!(staged_files(ctx), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unsupported_uploads(ctx: &TestContext) {
    let response = ctx
        .client
        .post_form(
            "/convert-form",
            &[FormPart::File {
                name: "file",
                filename: "setup.exe",
                bytes: b"MZ\x90\x00",
            }],
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE)
        .assert_error_message("not supported");
    assert_eq!(staged_files(ctx), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_oversized_uploads(ctx: &TestContext) {
    let bytes = vec![b'a'; TEST_MAX_UPLOAD_BYTES + 1];

    let response = ctx
        .client
        .post_form(
            "/convert-form",
            &[FormPart::File {
                name: "file",
                filename: "huge.txt",
                bytes: &bytes,
            }],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(staged_files(ctx), 0);
    assert!(ctx.jobs.is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_unreadable_documents(ctx: &TestContext) {
    let response = ctx
        .client
        .post_form(
            "/convert-form",
            &[FormPart::File {
                name: "file",
                filename: "broken.pdf",
                bytes: b"this is not a pdf document",
            }],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(staged_files(ctx), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_text_or_file(ctx: &TestContext) {
    let response = ctx
        .client
        .post_form("/convert-form", &[FormPart::Text("voice", "tone-en")])
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("either a text field or a file");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_non_numeric_speed(ctx: &TestContext) {
    let response = ctx
        .client
        .post_form(
            "/convert-form",
            &[
                FormPart::Text("text", ENGLISH_TEXT),
                FormPart::Text("speed", "fast"),
            ],
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("speed must be a number");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_download(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("/download/{}", uuid::Uuid::new_v4()))
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_when_audio_file_vanished(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/convert", &json!({"text": ENGLISH_TEXT}))
        .await
        .unwrap();
    let id = job_id(response.body.as_ref().unwrap());
    let job = ctx.jobs.get(id.parse().unwrap()).unwrap();
    std::fs::remove_file(&job.path).unwrap();

    let response = ctx.client.get(&format!("/download/{}", id)).await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("no longer exists");
}
