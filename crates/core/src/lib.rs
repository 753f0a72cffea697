//! Survey domain: the survey aggregate, survey requests and answers, and the
//! identity-keyed reconciliation engine used to update a persisted survey tree
//! in place.
//!
//! Nothing in this crate performs I/O. Loading and persisting aggregates is
//! the job of `surveys-db`; HTTP is the job of `surveys-api`.

pub mod answer;
pub mod error;
pub mod reconcile;
pub mod survey;
pub mod survey_request;
pub mod types;
