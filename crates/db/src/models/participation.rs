//! Participation and answer rows.

use serde::Serialize;
use sqlx::FromRow;
use surveys_core::answer::AnswerRequest;
use surveys_core::types::{DbId, Timestamp};

/// A row from the `participations` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Participation {
    pub id: DbId,
    pub survey_id: DbId,
    pub respondent: String,
    pub created_at: Timestamp,
}

/// One line of a survey's participant list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParticipantSummary {
    pub participation_id: DbId,
    pub respondent: String,
    pub answer_count: i64,
    pub created_at: Timestamp,
}

/// A row from the `answers` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Answer {
    pub id: DbId,
    pub participation_id: DbId,
    pub question_id: DbId,
    pub option_id: Option<DbId>,
    pub text: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Answer {
    /// The stored answer in request form, for re-checking a participation
    /// after one of its answers changes.
    pub fn as_request(&self) -> AnswerRequest {
        AnswerRequest {
            question_id: self.question_id,
            option_id: self.option_id,
            text: self.text.clone(),
        }
    }
}

/// A participation together with all of its answers.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipationWithAnswers {
    #[serde(flatten)]
    pub participation: Participation,
    pub answers: Vec<Answer>,
}
