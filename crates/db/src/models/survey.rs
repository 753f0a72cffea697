//! Survey, question and option rows.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::FromRow;
use surveys_core::error::CoreError;
use surveys_core::survey::{Question, QuestionOption, QuestionType, Survey};
use surveys_core::types::{DbId, Timestamp};

/// A row from the `surveys` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub picture_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionRow {
    pub id: DbId,
    pub survey_id: DbId,
    pub text: String,
    pub question_type: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `question_options` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionOptionRow {
    pub id: DbId,
    pub question_id: DbId,
    pub text: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fold flat rows into survey aggregates.
///
/// Child rows must already be sorted by `sort_order, id`; the relative order
/// within each parent is kept. Surveys come out in the order given. Rows whose
/// parent is not among the inputs are ignored.
pub fn assemble(
    surveys: Vec<SurveyRow>,
    questions: Vec<QuestionRow>,
    options: Vec<QuestionOptionRow>,
) -> Result<Vec<Survey>, CoreError> {
    let mut options_by_question: HashMap<DbId, Vec<QuestionOption>> = HashMap::new();
    for row in options {
        options_by_question
            .entry(row.question_id)
            .or_default()
            .push(QuestionOption {
                id: Some(row.id),
                question_id: Some(row.question_id),
                text: row.text,
            });
    }

    let mut questions_by_survey: HashMap<DbId, Vec<Question>> = HashMap::new();
    for row in questions {
        let question_type = QuestionType::from_value(&row.question_type).map_err(|_| {
            CoreError::Integrity(format!(
                "question {} has unknown type '{}'",
                row.id, row.question_type
            ))
        })?;
        let options = options_by_question.remove(&row.id).unwrap_or_default();
        questions_by_survey
            .entry(row.survey_id)
            .or_default()
            .push(Question {
                id: Some(row.id),
                survey_id: Some(row.survey_id),
                text: row.text,
                question_type,
                options,
            });
    }

    Ok(surveys
        .into_iter()
        .map(|row| Survey {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            picture_url: row.picture_url,
            questions: questions_by_survey.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}
