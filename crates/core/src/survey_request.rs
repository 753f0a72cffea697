//! Requested replacement trees submitted by clients, and their validation.
//!
//! A request mirrors the survey aggregate. At every level `id` is optional:
//! absent means "new node", present means "keep and update the node with
//! this identity" (or "new node" when no such node exists).

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::reconcile::{Identified, IdentityIndex};
use crate::survey::QuestionType;
use crate::types::DbId;

/// Maximum length of a survey title in characters.
pub const MAX_TITLE_LENGTH: u64 = 255;

/// Maximum length of a survey description in characters.
pub const MAX_DESCRIPTION_LENGTH: u64 = 5_000;

/// Maximum length of question or option text in characters.
pub const MAX_TEXT_LENGTH: u64 = 1_000;

/// Requested shape of a whole survey.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SurveyRequest {
    #[serde(default)]
    pub id: Option<DbId>,
    #[validate(
        custom(function = "not_blank"),
        length(max = MAX_TITLE_LENGTH, message = "Title is too long")
    )]
    pub title: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = MAX_DESCRIPTION_LENGTH, message = "Description is too long")
    )]
    pub description: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[validate(nested)]
    pub questions: Vec<QuestionRequest>,
}

/// Requested shape of one question.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionRequest {
    #[serde(default)]
    pub id: Option<DbId>,
    #[validate(
        custom(function = "not_blank"),
        length(max = MAX_TEXT_LENGTH, message = "Question text is too long")
    )]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<OptionRequest>,
}

/// Requested shape of one answer option.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OptionRequest {
    #[serde(default)]
    pub id: Option<DbId>,
    #[validate(
        custom(function = "not_blank"),
        length(max = MAX_TEXT_LENGTH, message = "Option text is too long")
    )]
    pub text: String,
}

impl Identified for QuestionRequest {
    type Id = DbId;

    fn identity(&self) -> Option<DbId> {
        self.id
    }
}

impl Identified for OptionRequest {
    type Id = DbId;

    fn identity(&self) -> Option<DbId> {
        self.id
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(
            ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")),
        );
    }
    Ok(())
}

/// Validate a request before it reaches the reconciliation engine.
///
/// Checks field constraints, then rejects any collection that names the same
/// identity twice (the engine would otherwise have to pick one of them).
pub fn validate_survey_request(request: &SurveyRequest) -> Result<(), CoreError> {
    request
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    ensure_unique_identities("question", &request.questions)?;
    for question in &request.questions {
        ensure_unique_identities("option", &question.options)?;
    }
    Ok(())
}

fn ensure_unique_identities<N: Identified>(level: &str, nodes: &[N]) -> Result<(), CoreError> {
    IdentityIndex::build(nodes).map(|_| ()).map_err(|dup| {
        CoreError::Validation(format!(
            "Duplicate {level} id {} in request (positions {} and {})",
            dup.id, dup.first, dup.second
        ))
    })
}
