//! Handlers for the `/surveys` resource.
//!
//! Updates go through the reconciliation engine: the stored tree is loaded
//! and locked, reconciled against the submitted tree, and written back in the
//! same transaction. Any failure before commit drops the transaction, so a
//! partially reconciled tree is never persisted.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use surveys_core::error::CoreError;
use surveys_core::reconcile::reconcile_survey;
use surveys_core::survey::Survey;
use surveys_core::survey_request::{validate_survey_request, SurveyRequest};
use surveys_core::types::DbId;
use surveys_db::repositories::SurveyRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Survey",
        id,
    })
}

/// POST /api/v1/surveys
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<SurveyRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<Survey>>)> {
    let Json(input) = payload?;
    validate_survey_request(&input)?;

    let mut survey = Survey::from_request(&input);
    SurveyRepo::create(&state.pool, &mut survey).await?;

    tracing::info!(
        survey_id = ?survey.id,
        questions = survey.questions.len(),
        options = survey.option_count(),
        "Survey created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(survey))))
}

/// GET /api/v1/surveys
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Survey>>>> {
    let surveys = SurveyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(surveys)))
}

/// GET /api/v1/surveys/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Survey>>> {
    let survey = SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(survey)))
}

/// PUT /api/v1/surveys/{id}
///
/// The path identifies the survey; an `id` in the body is ignored.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<SurveyRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<Survey>>> {
    let Json(input) = payload?;
    validate_survey_request(&input)?;

    let mut tx = state.pool.begin().await?;
    let mut survey = SurveyRepo::find_aggregate(&mut *tx, id, true)
        .await?
        .ok_or_else(|| not_found(id))?;

    let report = reconcile_survey(&mut survey, &input)?;
    SurveyRepo::persist_aggregate(&mut tx, &mut survey).await?;
    tx.commit().await?;

    if report.is_structural_noop() {
        tracing::debug!(survey_id = id, "Survey update changed fields only");
    } else {
        tracing::debug!(survey_id = id, ?report, "Survey update committed");
    }
    Ok(Json(DataResponse::new(survey)))
}

/// DELETE /api/v1/surveys/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = SurveyRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(survey_id = id, "Survey deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
