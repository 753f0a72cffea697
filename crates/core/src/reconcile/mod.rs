//! Identity-keyed reconciliation of owned entity trees.
//!
//! A persisted tree is brought in line with a requested replacement tree one
//! level at a time. At each level, children are matched to requested
//! nodes strictly by identity:
//!
//! - matched children are kept, in their current relative order, and updated
//!   from their requested node;
//! - children whose identity is not requested are removed, taking their own
//!   subtree with them;
//! - requested nodes that matched nothing (no identity, or an identity that no
//!   existing child carries) become new children appended in request order.
//!
//! [`level::reconcile_level`] implements one level generically over the child
//! and request types; deeper levels are reached from its update
//! callback. [`survey::reconcile_survey`] wires it up for the
//! Survey → Question → Option hierarchy.

use std::fmt;
use std::hash::Hash;

use crate::error::CoreError;

pub mod index;
pub mod level;
pub mod survey;

pub use index::{DuplicateIdentity, IdentityIndex};
pub use level::{reconcile_level, LevelOutcome};
pub use survey::{reconcile_survey, ReconcileReport};

/// A node that may carry an externally assigned identity.
///
/// `None` means the node has not been persisted yet (for entities) or is
/// requested as a new node (for requests).
pub trait Identified {
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    fn identity(&self) -> Option<Self::Id>;
}

/// Failure of a reconciliation call. The partially mutated tree must be
/// discarded, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError<Id> {
    /// Two existing children of one parent share an identity.
    #[error("{level} identity {id} is held by more than one existing node")]
    DuplicateExisting { level: &'static str, id: Id },

    /// One requested collection names the same identity more than once.
    #[error("{level} identity {id} is requested more than once")]
    DuplicateRequested { level: &'static str, id: Id },
}

impl<Id: fmt::Display> From<ReconcileError<Id>> for CoreError {
    fn from(err: ReconcileError<Id>) -> Self {
        match err {
            ReconcileError::DuplicateExisting { .. } => CoreError::Integrity(err.to_string()),
            ReconcileError::DuplicateRequested { .. } => CoreError::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn duplicate_existing_maps_to_integrity() {
        let err: CoreError = ReconcileError::DuplicateExisting {
            level: "question",
            id: 9_i64,
        }
        .into();
        assert_matches!(err, CoreError::Integrity(msg) if msg.contains("question identity 9"));
    }

    #[test]
    fn duplicate_requested_maps_to_validation() {
        let err: CoreError = ReconcileError::DuplicateRequested {
            level: "option",
            id: 2_i64,
        }
        .into();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("requested more than once"));
    }
}
