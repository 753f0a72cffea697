//! Answers a respondent submits against one survey.
//!
//! An answer always targets a question of the survey it is submitted to.
//! Choice questions are answered with one of their own options, text
//! questions with non-blank text. Single-choice and text questions take one
//! answer per participation; multiple-choice questions take each option once.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::reconcile::IdentityIndex;
use crate::survey::{QuestionType, Survey};
use crate::survey_request::{not_blank, MAX_TEXT_LENGTH};
use crate::types::DbId;

/// Maximum length of a respondent name in characters.
pub const MAX_RESPONDENT_LENGTH: u64 = 255;

/// One answer as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AnswerRequest {
    pub question_id: DbId,
    #[serde(default)]
    pub option_id: Option<DbId>,
    #[serde(default)]
    #[validate(length(max = MAX_TEXT_LENGTH, message = "Answer text is too long"))]
    pub text: Option<String>,
}

/// A respondent's full set of answers to one survey.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParticipationRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = MAX_RESPONDENT_LENGTH, message = "Respondent is too long")
    )]
    pub respondent: String,
    #[validate(nested)]
    pub answers: Vec<AnswerRequest>,
}

/// Field-level checks that need no survey.
pub fn validate_participation_request(request: &ParticipationRequest) -> Result<(), CoreError> {
    request
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    if request.answers.is_empty() {
        return Err(CoreError::Validation(
            "At least one answer is required".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_answer_request(request: &AnswerRequest) -> Result<(), CoreError> {
    request
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

/// Check a participation's complete answer set against the survey tree.
///
/// `answers` must be every answer of the participation, so that per-question
/// limits can be enforced.
pub fn check_answers(survey: &Survey, answers: &[AnswerRequest]) -> Result<(), CoreError> {
    let survey_id = survey.id.unwrap_or_default();
    let questions = IdentityIndex::build(survey.questions.as_slice()).map_err(|dup| {
        CoreError::Integrity(format!(
            "survey {survey_id} holds question {} twice",
            dup.id
        ))
    })?;

    let mut per_question: HashMap<DbId, usize> = HashMap::new();
    let mut chosen: HashSet<(DbId, DbId)> = HashSet::new();

    for answer in answers {
        let question_id = answer.question_id;
        let question = questions.get(&question_id).ok_or_else(|| {
            CoreError::Validation(format!(
                "Question {question_id} does not belong to survey {survey_id}"
            ))
        })?;

        match question.question_type {
            QuestionType::Text => {
                if answer.option_id.is_some() {
                    return Err(CoreError::Validation(format!(
                        "Question {question_id} takes a text answer, not an option"
                    )));
                }
                if !answer.text.as_deref().is_some_and(|t| !t.trim().is_empty()) {
                    return Err(CoreError::Validation(format!(
                        "Question {question_id} needs a non-blank text answer"
                    )));
                }
            }
            QuestionType::SingleChoice | QuestionType::MultipleChoice => {
                if answer.text.is_some() {
                    return Err(CoreError::Validation(format!(
                        "Question {question_id} takes an option, not text"
                    )));
                }
                let option_id = answer.option_id.ok_or_else(|| {
                    CoreError::Validation(format!("Question {question_id} needs an option"))
                })?;
                if !question.options.iter().any(|o| o.id == Some(option_id)) {
                    return Err(CoreError::Validation(format!(
                        "Option {option_id} does not belong to question {question_id}"
                    )));
                }
                if !chosen.insert((question_id, option_id)) {
                    return Err(CoreError::Validation(format!(
                        "Option {option_id} is chosen more than once"
                    )));
                }
            }
        }

        let count = per_question.entry(question_id).or_default();
        *count += 1;
        if *count > 1 && question.question_type != QuestionType::MultipleChoice {
            return Err(CoreError::Validation(format!(
                "Question {question_id} accepts a single answer"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::survey::{Question, QuestionOption};

    fn question(id: DbId, question_type: QuestionType, option_ids: &[DbId]) -> Question {
        Question {
            id: Some(id),
            survey_id: Some(1),
            text: format!("q{id}"),
            question_type,
            options: option_ids
                .iter()
                .map(|&o| QuestionOption {
                    id: Some(o),
                    question_id: Some(id),
                    text: format!("o{o}"),
                })
                .collect(),
        }
    }

    fn survey() -> Survey {
        Survey {
            id: Some(1),
            title: "Lunch".to_string(),
            description: "Where and what".to_string(),
            picture_url: None,
            questions: vec![
                question(1, QuestionType::SingleChoice, &[10, 11]),
                question(2, QuestionType::MultipleChoice, &[20, 21, 22]),
                question(3, QuestionType::Text, &[]),
            ],
        }
    }

    fn choice(question_id: DbId, option_id: DbId) -> AnswerRequest {
        AnswerRequest {
            question_id,
            option_id: Some(option_id),
            text: None,
        }
    }

    fn text(question_id: DbId, text: &str) -> AnswerRequest {
        AnswerRequest {
            question_id,
            option_id: None,
            text: Some(text.to_string()),
        }
    }

    fn rejected(answers: &[AnswerRequest]) -> String {
        match check_answers(&survey(), answers) {
            Err(CoreError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn complete_answer_set_is_accepted() {
        let answers = [
            choice(1, 11),
            choice(2, 20),
            choice(2, 22),
            text(3, "Near the office"),
        ];
        assert!(check_answers(&survey(), &answers).is_ok());
    }

    #[test]
    fn question_of_another_survey_is_rejected() {
        assert!(rejected(&[choice(9, 10)]).contains("Question 9 does not belong"));
    }

    #[test]
    fn option_of_another_question_is_rejected() {
        assert!(rejected(&[choice(1, 20)]).contains("Option 20 does not belong to question 1"));
    }

    #[test]
    fn single_choice_takes_one_answer() {
        assert!(rejected(&[choice(1, 10), choice(1, 11)]).contains("single answer"));
    }

    #[test]
    fn multiple_choice_rejects_repeated_option() {
        assert!(rejected(&[choice(2, 21), choice(2, 21)]).contains("chosen more than once"));
    }

    #[test]
    fn text_question_needs_non_blank_text() {
        assert!(rejected(&[text(3, "  ")]).contains("non-blank"));
        assert!(rejected(&[choice(3, 10)]).contains("text answer"));
    }

    #[test]
    fn choice_question_rejects_text() {
        assert!(rejected(&[text(1, "neither")]).contains("not text"));
    }

    #[test]
    fn duplicate_stored_question_is_an_integrity_error() {
        let mut broken = survey();
        broken.questions.push(question(1, QuestionType::Text, &[]));
        assert_matches!(
            check_answers(&broken, &[text(3, "x")]),
            Err(CoreError::Integrity(_))
        );
    }

    #[test]
    fn participation_needs_respondent_and_answers() {
        let blank = ParticipationRequest {
            respondent: " ".to_string(),
            answers: vec![choice(1, 10)],
        };
        assert_matches!(
            validate_participation_request(&blank),
            Err(CoreError::Validation(msg)) if msg.contains("respondent")
        );

        let empty = ParticipationRequest {
            respondent: "ana".to_string(),
            answers: vec![],
        };
        assert_matches!(
            validate_participation_request(&empty),
            Err(CoreError::Validation(msg)) if msg.contains("At least one answer")
        );
    }

    #[test]
    fn overlong_answer_text_is_rejected() {
        let long = text(3, &"x".repeat(MAX_TEXT_LENGTH as usize + 1));
        assert_matches!(
            validate_answer_request(&long),
            Err(CoreError::Validation(msg)) if msg.contains("too long")
        );
        assert!(validate_answer_request(&text(3, "fine")).is_ok());
    }

    #[test]
    fn participation_request_deserializes_optional_fields() {
        let request: ParticipationRequest = serde_json::from_value(serde_json::json!({
            "respondent": "ana",
            "answers": [
                {"question_id": 1, "option_id": 10},
                {"question_id": 3, "text": "hi"}
            ]
        }))
        .unwrap();
        assert_eq!(request.answers[0], choice(1, 10));
        assert_eq!(request.answers[1], text(3, "hi"));
    }
}
