//! Multipart endpoint tests: background and object removal, resume review.
//!
//! Run with: `cargo test -p inkwell-api --test uploads_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::auth::{bearer, free_token, premium_token, FREE_USER, PREMIUM_USER};
use helpers::fixtures::{image_form, object_form, resume_form};
use helpers::{setup_test_app, GENERATED_TEXT, MEDIA_BASE_URL, RESUME_TEXT};
use inkwell_core::models::CreationKind;

#[tokio::test]
async fn test_remove_background() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/ai/remove-image-background")
        .add_header("Authorization", bearer(&premium_token(PREMIUM_USER)))
        .multipart(image_form("portrait.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let data: serde_json::Value = response.json();
    assert_eq!(
        data["content"],
        format!("{}/no-bg/portrait.png", MEDIA_BASE_URL)
    );

    let records = app.creations.records();
    assert_eq!(records[0].kind, CreationKind::BackgroundRemoval);
    assert_eq!(records[0].prompt, "Remove background from the image");
}

#[tokio::test]
async fn test_remove_object() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/ai/remove-image-object")
        .add_header("Authorization", bearer(&premium_token(PREMIUM_USER)))
        .multipart(object_form("street.png", "car"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let data: serde_json::Value = response.json();
    assert_eq!(
        data["content"],
        format!("{}/no-car/street.png", MEDIA_BASE_URL)
    );
    assert_eq!(app.editor.removed_objects(), vec!["car".to_string()]);
    assert_eq!(app.creations.records()[0].prompt, "Removed car from image");
}

#[tokio::test]
async fn test_multi_word_object_rejected_without_external_call() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/ai/remove-image-object")
        .add_header("Authorization", bearer(&premium_token(PREMIUM_USER)))
        .multipart(object_form("street.png", "red car"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "INVALID_INPUT");
    assert_eq!(app.external_calls(), 0);
    assert!(app.creations.is_empty());
}

#[tokio::test]
async fn test_missing_image_rejected() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/ai/remove-image-background")
        .add_header("Authorization", bearer(&premium_token(PREMIUM_USER)))
        .multipart(MultipartForm::new().add_text("note", "no file here"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.editor.calls(), 0);
}

#[tokio::test]
async fn test_non_image_upload_rejected() {
    let app = setup_test_app();
    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(b"plain text".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );

    let response = app
        .client()
        .post("/api/ai/remove-image-background")
        .add_header("Authorization", bearer(&premium_token(PREMIUM_USER)))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.editor.calls(), 0);
}

#[tokio::test]
async fn test_image_editing_requires_premium() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/ai/remove-image-background")
        .add_header("Authorization", bearer(&free_token(FREE_USER)))
        .multipart(image_form("portrait.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(app.editor.calls(), 0);
}

#[tokio::test]
async fn test_resume_review() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/ai/resume-review")
        .add_header("Authorization", bearer(&premium_token(PREMIUM_USER)))
        .multipart(resume_form(2048))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let data: serde_json::Value = response.json();
    assert_eq!(data["content"], GENERATED_TEXT);

    assert_eq!(app.documents.calls(), 1);
    let sent = app.text.last_request().unwrap();
    assert!(sent.prompt.contains(RESUME_TEXT));
    assert_eq!(sent.max_tokens, 1000);

    let records = app.creations.records();
    assert_eq!(records[0].kind, CreationKind::ResumeReview);
    assert_eq!(records[0].prompt, "Review the uploaded resume");
}

#[tokio::test]
async fn test_oversized_resume_rejected_before_extraction() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/ai/resume-review")
        .add_header("Authorization", bearer(&premium_token(PREMIUM_USER)))
        .multipart(resume_form(6 * 1024 * 1024))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let data: serde_json::Value = response.json();
    assert_eq!(data["success"], false);
    assert!(data["message"]
        .as_str()
        .unwrap()
        .contains("exceeds allowed size"));
    assert_eq!(app.documents.calls(), 0);
    assert_eq!(app.text.calls(), 0);
}

#[tokio::test]
async fn test_extraction_failure_skips_language_model() {
    let app = setup_test_app();
    app.documents.set_failing(true);

    let response = app
        .client()
        .post("/api/ai/resume-review")
        .add_header("Authorization", bearer(&premium_token(PREMIUM_USER)))
        .multipart(resume_form(2048))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(app.text.calls(), 0);
    assert!(app.creations.is_empty());
}
