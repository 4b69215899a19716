//! Bounded walks over the parent relation
//!
//! Both walks are iterative and keep a visited set. In a forest every node
//! is reached exactly once, so meeting an id twice means the stored parent
//! relation contains a cycle.

use super::engine::{Corruption, TreeError, TreeResult};
use super::node::{Node, NodeId};
use crate::storage::NodeStore;
use std::collections::{HashSet, VecDeque};

fn corrupt(origin: NodeId, corruption: Corruption) -> TreeError {
    tracing::error!(%origin, %corruption, "corrupt hierarchy detected");
    TreeError::CorruptHierarchy { origin, corruption }
}

/// The chain from the furthest ancestor down to `origin`, inclusive.
pub(crate) fn ancestor_chain(
    store: &dyn NodeStore,
    origin: NodeId,
    max_visits: usize,
) -> TreeResult<Vec<Node>> {
    let node = store.get_node(origin)?.ok_or(TreeError::NotFound(origin))?;

    let mut seen: HashSet<NodeId> = HashSet::new();
    seen.insert(origin);

    let mut parent_id = node.parent_id;
    let mut chain = vec![node];

    while let Some(id) = parent_id {
        if chain.len() >= max_visits {
            return Err(corrupt(origin, Corruption::LimitExceeded(max_visits)));
        }
        if !seen.insert(id) {
            return Err(corrupt(origin, Corruption::Cycle(id)));
        }
        let parent = store
            .get_node(id)?
            .ok_or_else(|| corrupt(origin, Corruption::DanglingParent(id)))?;
        parent_id = parent.parent_id;
        chain.push(parent);
    }

    chain.reverse();
    Ok(chain)
}

/// Breadth-first closure over child edges, including `root`.
///
/// The caller checks that `root` exists.
pub(crate) fn descendant_closure(
    store: &dyn NodeStore,
    root: NodeId,
    max_visits: usize,
) -> TreeResult<HashSet<NodeId>> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    visited.insert(root);
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        for child in store.child_ids(current)? {
            if !visited.insert(child) {
                return Err(corrupt(root, Corruption::Cycle(child)));
            }
            if visited.len() > max_visits {
                return Err(corrupt(root, Corruption::LimitExceeded(max_visits)));
            }
            queue.push_back(child);
        }
    }

    tracing::debug!(%root, visited = visited.len(), "descendant closure complete");
    Ok(visited)
}
