//! HTTP error type for the survey handlers.
//!
//! Every failure leaves the service as `{ "error": <message>, "code": <CODE> }`
//! with a matching status. Messages for server-side faults are replaced by a
//! generic text; the detail goes to the log.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use surveys_core::error::CoreError;
use surveys_db::DbError;

const GENERIC_INTERNAL: &str = "An internal error occurred";
const GENERIC_INTEGRITY: &str = "Stored data is inconsistent; the update was not applied";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain failure raised by validation, reconciliation or a lookup.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request body could not be read as the expected JSON document.
    #[error(transparent)]
    Json(#[from] JsonRejection),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(err) => AppError::Database(err),
            DbError::Core(err) => AppError::Core(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(err) => core_parts(err),
            AppError::Database(err) => database_parts(err),
            AppError::Json(rejection) => {
                (rejection.status(), "INVALID_JSON", rejection.body_text())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Integrity(msg) => {
            tracing::error!(error = %msg, "Stored survey data is inconsistent, request aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATA_INTEGRITY_ERROR",
                GENERIC_INTEGRITY.to_string(),
            )
        }
    }
}

/// `RowNotFound` is a 404. A foreign-key violation means a parent row vanished
/// under a concurrent writer and is a 409. Anything else is a 500.
fn database_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!(
                "Referenced parent no longer exists: {}",
                db_err.constraint().unwrap_or("unknown")
            ),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        GENERIC_INTERNAL.to_string(),
    )
}
