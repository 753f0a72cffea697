//! Handlers for individual answers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use surveys_core::answer::{check_answers, validate_answer_request, AnswerRequest};
use surveys_core::error::CoreError;
use surveys_core::types::DbId;
use surveys_db::models::participation::Answer;
use surveys_db::repositories::{AnswerRepo, ParticipationRepo, SurveyRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Answer",
        id,
    })
}

/// GET /api/v1/answers
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Answer>>>> {
    let answers = AnswerRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(answers)))
}

/// GET /api/v1/answers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Answer>>> {
    let mut conn = state.pool.acquire().await?;
    let answer = AnswerRepo::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(answer)))
}

/// PUT /api/v1/answers/{id}
///
/// The participation's whole answer set, with this answer replaced, is
/// re-checked against the current survey before the row is written.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<Answer>>> {
    let Json(input) = payload?;
    validate_answer_request(&input)?;

    let mut tx = state.pool.begin().await?;
    let current = AnswerRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let participation = ParticipationRepo::find_by_id(&mut *tx, current.participation_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Participation",
            id: current.participation_id,
        })?;
    let survey = SurveyRepo::find_aggregate(&mut *tx, participation.survey_id, false)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Survey",
            id: participation.survey_id,
        })?;

    let stored = AnswerRepo::list_for_participation(&mut *tx, participation.id).await?;
    let answer_set: Vec<AnswerRequest> = stored
        .iter()
        .map(|a| if a.id == id { input.clone() } else { a.as_request() })
        .collect();
    check_answers(&survey, &answer_set)?;

    let updated = AnswerRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    tracing::info!(answer_id = id, participation_id = participation.id, "Answer updated");
    Ok(Json(DataResponse::new(updated)))
}

/// DELETE /api/v1/answers/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if AnswerRepo::delete(&state.pool, id).await? {
        tracing::info!(answer_id = id, "Answer deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
