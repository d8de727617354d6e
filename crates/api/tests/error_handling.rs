//! `AppError` to HTTP response mapping, checked on the JSON body.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use gigify_api::error::AppError;
use gigify_core::error::CoreError;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_names_entity_and_id() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFound {
        entity: "event",
        id: 42,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "event with id 42 not found");
}

#[tokio::test]
async fn not_owner_is_forbidden() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotOwner {
        entity: "event",
        id: 3,
    }))
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "NOT_OWNER");
}

#[tokio::test]
async fn insufficient_candidates_is_unprocessable() {
    let (status, json) = error_to_response(AppError::Core(CoreError::InsufficientCandidates {
        requested: 5,
        available: 2,
    }))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INSUFFICIENT_CANDIDATES");
}

#[tokio::test]
async fn storage_errors_are_sanitized() {
    let (status, json) = error_to_response(AppError::Core(CoreError::Storage(
        "connection refused to 10.0.0.3:5432".into(),
    )))
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Upstream("calendar down".into()))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn bad_request_keeps_message() {
    let (status, json) =
        error_to_response(AppError::BadRequest("X-Calendar-Token header is required".into()))
            .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "X-Calendar-Token header is required");
}
