//! Common fixtures for asset-tree integration tests
//!
//! Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use asset_tree::{
    default_table, BuildOutcome, Node, NodeId, OpenStore, RootScope, SqliteStore, TaxonomyBuilder,
    TreeEngine,
};
use std::sync::Arc;

/// Number of nodes in the bundled site taxonomy
pub const SITE_NODE_COUNT: usize = 47_801;

pub fn memory_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().expect("in-memory store"))
}

/// An in-memory store loaded with the bundled site taxonomy
pub fn site_store() -> Arc<SqliteStore> {
    let store = memory_store();
    let outcome = TaxonomyBuilder::new(store.clone())
        .populate(&default_table().expect("bundled table parses"))
        .expect("bundled table loads");
    assert_eq!(outcome, BuildOutcome::Populated { nodes: SITE_NODE_COUNT });
    store
}

/// Follow `names` from the roots down, one name per level
pub fn node_at(engine: &TreeEngine, names: &[&str]) -> Node {
    let mut parent: Option<NodeId> = None;
    let mut found = None;
    for name in names {
        let children = engine
            .children_of(parent, RootScope::Unscoped)
            .expect("children query");
        let node = children
            .into_iter()
            .find(|n| n.name == *name)
            .unwrap_or_else(|| panic!("no node '{}' under {:?}", name, parent));
        parent = Some(node.id);
        found = Some(node);
    }
    found.expect("at least one name")
}
