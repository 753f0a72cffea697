//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool`, or a connection/transaction when the caller controls the unit
//! of work.

pub mod answer_repo;
pub mod participation_repo;
pub mod survey_repo;

pub use answer_repo::AnswerRepo;
pub use participation_repo::ParticipationRepo;
pub use survey_repo::SurveyRepo;
