//! Row structs for the survey and participation tables.
//!
//! Survey rows are flat; [`survey::assemble`] folds them into the
//! `surveys_core::survey::Survey` aggregate. Participation rows are served
//! as they are.

pub mod participation;
pub mod survey;
