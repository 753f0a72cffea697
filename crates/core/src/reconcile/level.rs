//! Reconciliation of a single tree level.

use std::collections::HashSet;

use super::{Identified, IdentityIndex, ReconcileError};

/// What happened to one parent's child collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelOutcome<Id> {
    /// Existing children matched by identity and updated in place.
    pub kept: usize,
    /// Children minted for requested nodes that matched nothing.
    pub created: usize,
    /// Identities of existing children that were dropped.
    pub removed: Vec<Id>,
    /// Dropped children that had never been persisted.
    pub removed_unsaved: usize,
}

impl<Id> LevelOutcome<Id> {
    pub fn removed_count(&self) -> usize {
        self.removed.len() + self.removed_unsaved
    }
}

/// Reconcile `existing` against `requested` at one level.
///
/// Matching is two-pass. The first pass intersects the identities of both
/// collections; the second keeps exactly the existing children in that
/// intersection (in their current order, updated through `apply_update`),
/// then appends one `create_child` result per unmatched requested node in
/// request order. A requested identity that no existing child carries is
/// treated as a new node; `create_child` is expected to discard it.
///
/// Duplicate identities on either side abort before anything is touched.
/// An error from `apply_update` aborts midway; the caller must then discard
/// the tree.
pub fn reconcile_level<C, R, U, F>(
    level: &'static str,
    existing: &mut Vec<C>,
    requested: &[R],
    mut apply_update: U,
    mut create_child: F,
) -> Result<LevelOutcome<C::Id>, ReconcileError<C::Id>>
where
    C: Identified,
    R: Identified<Id = C::Id>,
    U: FnMut(&mut C, &R) -> Result<(), ReconcileError<C::Id>>,
    F: FnMut(&R) -> C,
{
    let existing_index = IdentityIndex::build(existing.as_slice())
        .map_err(|dup| ReconcileError::DuplicateExisting { level, id: dup.id })?;
    let requested_index = IdentityIndex::build(requested)
        .map_err(|dup| ReconcileError::DuplicateRequested { level, id: dup.id })?;

    let matched: HashSet<C::Id> = existing_index
        .ids()
        .filter(|id| requested_index.contains(id))
        .collect();

    let mut outcome = LevelOutcome {
        kept: 0,
        created: 0,
        removed: Vec::new(),
        removed_unsaved: 0,
    };

    existing.retain(|child| match child.identity() {
        Some(id) if matched.contains(&id) => true,
        Some(id) => {
            outcome.removed.push(id);
            false
        }
        None => {
            outcome.removed_unsaved += 1;
            false
        }
    });

    for child in existing.iter_mut() {
        let req = child
            .identity()
            .and_then(|id| requested_index.get(&id));
        if let Some(req) = req {
            apply_update(child, req)?;
        }
    }
    outcome.kept = existing.len();

    for req in requested {
        if req.identity().is_some_and(|id| matched.contains(&id)) {
            continue;
        }
        existing.push(create_child(req));
        outcome.created += 1;
    }

    Ok(outcome)
}
