//! Handlers for submitting and reading participations.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use surveys_core::answer::{check_answers, validate_participation_request, ParticipationRequest};
use surveys_core::error::CoreError;
use surveys_core::types::DbId;
use surveys_db::models::participation::{ParticipantSummary, ParticipationWithAnswers};
use surveys_db::repositories::{AnswerRepo, ParticipationRepo, SurveyRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/surveys/{id}/participations
///
/// The answers are checked against the survey as loaded inside the
/// transaction. If a concurrent update removes an answered question or option
/// before commit, the insert fails on its foreign key and the client gets 409.
pub async fn create(
    State(state): State<AppState>,
    Path(survey_id): Path<DbId>,
    payload: Result<Json<ParticipationRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<ParticipationWithAnswers>>)> {
    let Json(input) = payload?;
    validate_participation_request(&input)?;

    let mut tx = state.pool.begin().await?;
    let survey = SurveyRepo::find_aggregate(&mut *tx, survey_id, false)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Survey",
            id: survey_id,
        })?;
    check_answers(&survey, &input.answers)?;

    let participation =
        ParticipationRepo::insert(&mut *tx, survey_id, input.respondent.trim()).await?;
    let answers = AnswerRepo::insert_many(&mut *tx, participation.id, &input.answers).await?;
    tx.commit().await?;

    tracing::info!(
        survey_id,
        participation_id = participation.id,
        answers = answers.len(),
        "Participation recorded"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ParticipationWithAnswers {
            participation,
            answers,
        })),
    ))
}

/// GET /api/v1/surveys/{id}/participants
pub async fn list_participants(
    State(state): State<AppState>,
    Path(survey_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ParticipantSummary>>>> {
    if !SurveyRepo::exists(&state.pool, survey_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id: survey_id,
        }));
    }
    let participants = ParticipationRepo::list_participants(&state.pool, survey_id).await?;
    Ok(Json(DataResponse::new(participants)))
}

/// GET /api/v1/participations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ParticipationWithAnswers>>> {
    let mut conn = state.pool.acquire().await?;
    let participation = ParticipationRepo::find_by_id(&mut *conn, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Participation",
            id,
        })?;
    let answers = AnswerRepo::list_for_participation(&mut *conn, id).await?;
    Ok(Json(DataResponse::new(ParticipationWithAnswers {
        participation,
        answers,
    })))
}
