//! Survey → Question → Option reconciliation.

use super::{reconcile_level, IdentityIndex, LevelOutcome, ReconcileError};
use crate::error::CoreError;
use crate::survey::{Question, QuestionOption, Survey};
use crate::survey_request::{OptionRequest, SurveyRequest};
use crate::types::DbId;

pub const QUESTION_LEVEL: &str = "question";
pub const OPTION_LEVEL: &str = "option";

/// Totals for one reconciliation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub questions_kept: usize,
    pub questions_created: usize,
    pub questions_removed: usize,
    /// Options under kept questions that were matched and updated.
    pub options_kept: usize,
    /// Options minted, both under kept questions and inside new questions.
    pub options_created: usize,
    /// Options removed from kept questions. Options of removed questions go
    /// with their question and are not counted here.
    pub options_removed: usize,
}

impl ReconcileReport {
    /// `true` when nothing was created or removed at any level.
    pub fn is_structural_noop(&self) -> bool {
        self.questions_created == 0
            && self.questions_removed == 0
            && self.options_created == 0
            && self.options_removed == 0
    }

    fn absorb_options(&mut self, outcome: &LevelOutcome<DbId>) {
        self.options_kept += outcome.kept;
        self.options_created += outcome.created;
        self.options_removed += outcome.removed_count();
    }
}

/// Bring a persisted survey in line with a requested replacement tree.
///
/// Mutates `survey` in place: its own fields are overwritten first, then its
/// questions are reconciled, and each kept question's options are reconciled
/// in turn. New questions arrive with their full option list built by the
/// entity factory. The caller persists the result; on error the caller must
/// drop the survey instead.
///
/// Every requested option list is checked for repeated identities up front,
/// whether its question will be kept or created, so a rejected request leaves
/// `survey` untouched.
pub fn reconcile_survey(
    survey: &mut Survey,
    request: &SurveyRequest,
) -> Result<ReconcileReport, CoreError> {
    for question in &request.questions {
        IdentityIndex::build(question.options.as_slice()).map_err(|dup| {
            ReconcileError::DuplicateRequested {
                level: OPTION_LEVEL,
                id: dup.id,
            }
        })?;
    }

    survey.apply_fields(request);

    let survey_id = survey.id;
    let mut report = ReconcileReport::default();

    let questions = reconcile_level(
        QUESTION_LEVEL,
        &mut survey.questions,
        &request.questions,
        |question, requested| {
            question.apply_fields(requested);
            let outcome = reconcile_options(question, &requested.options)?;
            report.absorb_options(&outcome);
            Ok(())
        },
        |requested| Question::from_request(requested, survey_id),
    )?;

    report.questions_kept = questions.kept;
    report.questions_created = questions.created;
    report.questions_removed = questions.removed_count();
    report.options_created += survey.questions[questions.kept..]
        .iter()
        .map(|q| q.options.len())
        .sum::<usize>();

    tracing::debug!(
        survey_id = ?survey_id,
        kept = questions.kept,
        created = questions.created,
        removed = ?questions.removed,
        "Reconciled questions"
    );
    tracing::info!(
        survey_id = ?survey_id,
        questions_kept = report.questions_kept,
        questions_created = report.questions_created,
        questions_removed = report.questions_removed,
        options_kept = report.options_kept,
        options_created = report.options_created,
        options_removed = report.options_removed,
        "Survey reconciled"
    );

    Ok(report)
}

fn reconcile_options(
    question: &mut Question,
    requested: &[OptionRequest],
) -> Result<LevelOutcome<DbId>, ReconcileError<DbId>> {
    let question_id = question.id;
    let outcome = reconcile_level(
        OPTION_LEVEL,
        &mut question.options,
        requested,
        |option, requested| {
            option.apply_fields(requested);
            Ok(())
        },
        |requested| QuestionOption::from_request(requested, question_id),
    )?;

    tracing::debug!(
        question_id = ?question_id,
        kept = outcome.kept,
        created = outcome.created,
        removed = ?outcome.removed,
        "Reconciled options"
    );
    Ok(outcome)
}
