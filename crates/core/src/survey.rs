//! Survey aggregate: a three-level owned tree Survey → Question → Option.
//!
//! Each child carries its parent's identity as a plain back-reference used
//! for persistence. Lifetime is governed solely by membership in the parent's
//! collection.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reconcile::Identified;
use crate::survey_request::{OptionRequest, QuestionRequest, SurveyRequest};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Question type
// ---------------------------------------------------------------------------

/// Closed set of question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Text,
}

impl QuestionType {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::Text => "text",
        }
    }

    /// Parse the database representation.
    pub fn from_value(value: &str) -> Result<Self, CoreError> {
        match value {
            "single_choice" => Ok(Self::SingleChoice),
            "multiple_choice" => Ok(Self::MultipleChoice),
            "text" => Ok(Self::Text),
            other => Err(CoreError::Validation(format!(
                "Unknown question type '{other}'. Must be one of: single_choice, multiple_choice, text"
            ))),
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: Option<DbId>,
    pub title: String,
    pub description: String,
    pub picture_url: Option<String>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Option<DbId>,
    /// Owning survey. `None` until the survey itself has been persisted.
    #[serde(skip)]
    pub survey_id: Option<DbId>,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: Option<DbId>,
    /// Owning question. `None` until the question has been persisted.
    #[serde(skip)]
    pub question_id: Option<DbId>,
    pub text: String,
}

impl Identified for Question {
    type Id = DbId;

    fn identity(&self) -> Option<DbId> {
        self.id
    }
}

impl Identified for QuestionOption {
    type Id = DbId;

    fn identity(&self) -> Option<DbId> {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Entity factory
// ---------------------------------------------------------------------------
//
// Requested identities are never copied: new entities are unidentified until
// the storage layer assigns one.

impl Survey {
    /// Build a brand-new survey tree from a request (initial creation path).
    pub fn from_request(request: &SurveyRequest) -> Self {
        Self {
            id: None,
            title: request.title.clone(),
            description: request.description.clone(),
            picture_url: request.picture_url.clone(),
            questions: request
                .questions
                .iter()
                .map(|q| Question::from_request(q, None))
                .collect(),
        }
    }

    /// Copy the survey's own scalar fields from a request.
    pub fn apply_fields(&mut self, request: &SurveyRequest) {
        self.title.clone_from(&request.title);
        self.description.clone_from(&request.description);
        self.picture_url.clone_from(&request.picture_url);
    }

    pub fn option_count(&self) -> usize {
        self.questions.iter().map(|q| q.options.len()).sum()
    }
}

impl Question {
    /// Mint a new question (and all of its options) owned by `survey_id`.
    pub fn from_request(request: &QuestionRequest, survey_id: Option<DbId>) -> Self {
        Self {
            id: None,
            survey_id,
            text: request.text.clone(),
            question_type: request.question_type,
            options: request
                .options
                .iter()
                .map(|o| QuestionOption::from_request(o, None))
                .collect(),
        }
    }

    /// Copy the question's own scalar fields (not its options).
    pub fn apply_fields(&mut self, request: &QuestionRequest) {
        self.text.clone_from(&request.text);
        self.question_type = request.question_type;
    }
}

impl QuestionOption {
    /// Mint a new option owned by `question_id`.
    pub fn from_request(request: &OptionRequest, question_id: Option<DbId>) -> Self {
        Self {
            id: None,
            question_id,
            text: request.text.clone(),
        }
    }

    pub fn apply_fields(&mut self, request: &OptionRequest) {
        self.text.clone_from(&request.text);
    }
}
