//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use surveys_api::error::AppError;
use surveys_core::error::CoreError;
use surveys_core::reconcile::ReconcileError;
use surveys_db::DbError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Survey",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Survey with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400_with_message() {
    let err = AppError::Core(CoreError::Validation("title: must not be blank".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "title: must not be blank");
}

#[tokio::test]
async fn integrity_error_returns_500_and_hides_details() {
    let err = AppError::Core(CoreError::Integrity(
        "question 7 appears twice in the stored survey".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DATA_INTEGRITY_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(!message.contains("question 7"));
}

#[tokio::test]
async fn duplicate_stored_identity_surfaces_as_integrity_error() {
    let core: CoreError = ReconcileError::DuplicateExisting {
        level: "question",
        id: 3_i64,
    }
    .into();

    let (status, json) = error_to_response(core.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DATA_INTEGRITY_ERROR");
}

#[tokio::test]
async fn duplicate_requested_identity_surfaces_as_validation_error() {
    let core: CoreError = ReconcileError::DuplicateRequested {
        level: "option",
        id: 9_i64,
    }
    .into();

    let (status, json) = error_to_response(core.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn pool_timeout_returns_500() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn corrupt_stored_tree_from_repository_surfaces_as_integrity_error() {
    let err = DbError::Core(CoreError::Integrity(
        "question 4 has unknown type 'ranking'".into(),
    ));

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DATA_INTEGRITY_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("ranking"));
}

#[tokio::test]
async fn repository_sqlx_error_keeps_database_mapping() {
    let (status, json) = error_to_response(DbError::Sqlx(sqlx::Error::RowNotFound).into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
