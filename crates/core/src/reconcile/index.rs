//! Identity lookup over one level of a tree.

use std::collections::HashMap;

use super::Identified;

/// Two nodes of one collection carry the same identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identity {id} appears at positions {first} and {second}")]
pub struct DuplicateIdentity<Id> {
    pub id: Id,
    pub first: usize,
    pub second: usize,
}

/// Maps each present identity of a collection to its node and position.
///
/// Nodes without an identity are not indexed. Building fails on the first
/// identity seen twice; the index never silently keeps one of two holders.
#[derive(Debug)]
pub struct IdentityIndex<'a, N: Identified> {
    by_id: HashMap<N::Id, (usize, &'a N)>,
}

impl<'a, N: Identified> IdentityIndex<'a, N> {
    pub fn build(nodes: &'a [N]) -> Result<Self, DuplicateIdentity<N::Id>> {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            let Some(id) = node.identity() else {
                continue;
            };
            if let Some(&(first, _)) = by_id.get(&id) {
                return Err(DuplicateIdentity {
                    id,
                    first,
                    second: position,
                });
            }
            by_id.insert(id, (position, node));
        }
        Ok(Self { by_id })
    }

    pub fn get(&self, id: &N::Id) -> Option<&'a N> {
        self.by_id.get(id).map(|&(_, node)| node)
    }

    pub fn contains(&self, id: &N::Id) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = N::Id> + '_ {
        self.by_id.keys().copied()
    }
}
