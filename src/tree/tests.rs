//! Property tests for the tree engine against a real SQLite store

use super::*;
use crate::config::TreeConfig;
use crate::storage::{NodeStore, OpenStore, SqliteStore};
use std::collections::HashSet;
use std::sync::Arc;

struct Fixture {
    store: Arc<SqliteStore>,
    engine: TreeEngine,
    site: NodeId,
    warehouses: Vec<NodeId>,
    racks: Vec<NodeId>,
    deposit: NodeId,
    shelves: Vec<NodeId>,
}

fn insert(store: &SqliteStore, name: &str, kind: &str, parent: Option<NodeId>) -> NodeId {
    let mut node = NewNode::new(name, kind);
    node.parent_id = parent;
    store.insert_node(&node).unwrap()
}

/// Site > W01..W10, W01 > R01..R16, plus a storage root with two shelves.
///
/// Warehouses are inserted in reverse so ordering cannot come from ids.
fn build_fixture(config: TreeConfig) -> Fixture {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let site = insert(&store, "Site", "Warehouse", None);

    let mut warehouses: Vec<NodeId> = (1..=10)
        .rev()
        .map(|i| insert(&store, &format!("W{:02}", i), "Rack", Some(site)))
        .collect();
    warehouses.reverse();

    let racks = (1..=16)
        .map(|j| insert(&store, &format!("R{:02}", j), "Rack", Some(warehouses[0])))
        .collect();

    let deposit = insert(&store, "Deposito Central", "Centro de Almacenamiento", None);
    let shelves = (1..=2)
        .map(|k| insert(&store, &format!("E{:02}", k), "Estante", Some(deposit)))
        .collect();

    let engine = TreeEngine::with_config(store.clone(), config);
    Fixture {
        store,
        engine,
        site,
        warehouses,
        racks,
        deposit,
        shelves,
    }
}

fn fixture() -> Fixture {
    build_fixture(TreeConfig::default())
}

fn all_node_ids(engine: &TreeEngine) -> Vec<NodeId> {
    let mut ids = Vec::new();
    let mut frontier: Vec<Option<NodeId>> = vec![None];
    while let Some(parent) = frontier.pop() {
        for node in engine.children_of(parent, RootScope::Unscoped).unwrap() {
            ids.push(node.id);
            frontier.push(Some(node.id));
        }
    }
    ids
}

fn names(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

// ============================================================================
// Example scenario
// ============================================================================

#[test]
fn example_scenario() {
    let fx = fixture();

    let children = fx.engine.children_of(Some(fx.site), RootScope::Unscoped).unwrap();
    let expected: Vec<String> = (1..=10).map(|i| format!("W{:02}", i)).collect();
    assert_eq!(names(&children), expected.iter().map(String::as_str).collect::<Vec<_>>());

    assert_eq!(fx.engine.full_path(fx.racks[0]).unwrap(), "Site > W01 > R01");
    assert_eq!(fx.engine.descendant_ids(fx.site).unwrap().len(), 27);
}

// ============================================================================
// children_of
// ============================================================================

#[test]
fn children_are_sorted_by_name() {
    let fx = fixture();
    let racks = fx.engine.children_of(Some(fx.warehouses[0]), RootScope::Unscoped).unwrap();
    assert_eq!(racks.len(), 16);
    assert!(racks.windows(2).all(|w| w[0].name < w[1].name));

    // Stable across calls with no mutation in between
    let again = fx.engine.children_of(Some(fx.warehouses[0]), RootScope::Unscoped).unwrap();
    assert_eq!(racks, again);
}

#[test]
fn scope_only_applies_at_root_level() {
    let fx = fixture();
    let under_site = fx.engine.children_of(Some(fx.site), RootScope::StorageRoots).unwrap();
    assert_eq!(under_site.len(), 10);

    let shelves = fx.engine.children_of(Some(fx.deposit), RootScope::OperationalRoots).unwrap();
    assert_eq!(names(&shelves), vec!["E01", "E02"]);
}

#[test]
fn root_scopes_partition_the_roots() {
    let fx = fixture();
    insert(&fx.store, "Laboratorio", "Centro de Pruebas", None);
    insert(&fx.store, "Estante Suelto", "Estante", None);
    insert(&fx.store, "HSY", "HIVE SITE YGUAZU", None);

    let ids = |scope| -> HashSet<NodeId> {
        fx.engine
            .children_of(None, scope)
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect()
    };

    let operational = ids(RootScope::OperationalRoots);
    let storage = ids(RootScope::StorageRoots);
    let all = ids(RootScope::Unscoped);

    assert!(operational.is_disjoint(&storage));
    let union: HashSet<NodeId> = operational.union(&storage).copied().collect();
    assert_eq!(union, all);
    assert_eq!(storage.len(), 3);
    assert_eq!(operational.len(), 2);
    assert!(storage.contains(&fx.deposit));
    assert!(operational.contains(&fx.site));
}

// ============================================================================
// full_path
// ============================================================================

#[test]
fn full_path_extends_parent_path() {
    let fx = fixture();
    for id in all_node_ids(&fx.engine) {
        let node = fx.engine.require_node(id).unwrap();
        let path = fx.engine.full_path(id).unwrap();
        match node.parent_id {
            Some(parent) => {
                let parent_path = fx.engine.full_path(parent).unwrap();
                assert_eq!(path, format!("{} > {}", parent_path, node.name));
            }
            None => assert_eq!(path, node.name),
        }
    }
}

#[test]
fn full_path_of_missing_node_is_not_found() {
    let fx = fixture();
    let err = fx.engine.full_path(NodeId::new(10_000)).unwrap_err();
    assert!(matches!(err, TreeError::NotFound(id) if id == NodeId::new(10_000)));
}

#[test]
fn full_path_of_no_selection_is_empty() {
    let fx = fixture();
    assert_eq!(fx.engine.full_path_opt(None).unwrap(), "");
    assert_eq!(fx.engine.full_path_opt(Some(fx.shelves[1])).unwrap(), "Deposito Central > E02");
}

#[test]
fn full_path_uses_configured_separator() {
    let config = TreeConfig {
        path_separator: "/".to_string(),
        ..TreeConfig::default()
    };
    let fx = build_fixture(config);
    assert_eq!(fx.engine.full_path(fx.racks[15]).unwrap(), "Site/W01/R16");
}

#[test]
fn ancestors_run_root_first() {
    let fx = fixture();
    let chain = fx.engine.ancestors(fx.racks[2]).unwrap();
    assert_eq!(names(&chain), vec!["Site", "W01", "R03"]);
    assert!(chain[0].is_root());
}

// ============================================================================
// descendant_ids
// ============================================================================

#[test]
fn descendant_closure_matches_ancestor_relation() {
    let fx = fixture();
    let ids = all_node_ids(&fx.engine);

    for &origin in &ids {
        let closure = fx.engine.descendant_ids(origin).unwrap();
        assert!(closure.contains(&origin));

        for &candidate in &ids {
            let under_origin = fx
                .engine
                .ancestors(candidate)
                .unwrap()
                .iter()
                .any(|n| n.id == origin);
            assert_eq!(closure.contains(&candidate), under_origin);
        }
    }
}

#[test]
fn descendant_ids_of_absent_root_is_empty() {
    let fx = fixture();
    assert!(fx.engine.descendant_ids(NodeId::new(10_000)).unwrap().is_empty());
    assert!(fx.engine.descendant_ids_opt(None).unwrap().is_empty());
}

#[test]
fn descendant_ids_of_leaf_is_itself() {
    let fx = fixture();
    let closure = fx.engine.descendant_ids(fx.racks[5]).unwrap();
    assert_eq!(closure, HashSet::from([fx.racks[5]]));
}

// ============================================================================
// Safety bounds
// ============================================================================

fn rig_cycle(fx: &Fixture) -> (NodeId, NodeId) {
    let a = insert(&fx.store, "A", "Rack", None);
    let b = insert(&fx.store, "B", "Rack", Some(a));
    fx.store
        .execute_raw(&format!("UPDATE nodes SET parent_id = {} WHERE id = {}", b, a))
        .unwrap();
    (a, b)
}

#[test]
fn cycle_is_reported_by_descendant_ids() {
    let fx = fixture();
    let (a, _) = rig_cycle(&fx);

    let err = fx.engine.descendant_ids(a).unwrap_err();
    assert!(matches!(
        err,
        TreeError::CorruptHierarchy { origin, corruption: Corruption::Cycle(_) } if origin == a
    ));
}

#[test]
fn cycle_is_reported_by_full_path() {
    let fx = fixture();
    let (a, b) = rig_cycle(&fx);

    for id in [a, b] {
        let err = fx.engine.full_path(id).unwrap_err();
        assert!(matches!(err, TreeError::CorruptHierarchy { corruption: Corruption::Cycle(_), .. }));
    }
}

#[test]
fn self_parent_is_a_cycle() {
    let fx = fixture();
    let a = insert(&fx.store, "Loop", "Rack", None);
    fx.store
        .execute_raw(&format!("UPDATE nodes SET parent_id = {0} WHERE id = {0}", a))
        .unwrap();

    assert!(matches!(fx.engine.full_path(a), Err(TreeError::CorruptHierarchy { .. })));
    assert!(matches!(fx.engine.descendant_ids(a), Err(TreeError::CorruptHierarchy { .. })));
}

#[test]
fn visit_ceiling_is_enforced() {
    let config = TreeConfig {
        max_visits: 5,
        ..TreeConfig::default()
    };
    let fx = build_fixture(config);

    let err = fx.engine.descendant_ids(fx.site).unwrap_err();
    assert!(matches!(
        err,
        TreeError::CorruptHierarchy { corruption: Corruption::LimitExceeded(5), .. }
    ));

    // Small subtrees stay within the bound
    assert_eq!(fx.engine.descendant_ids(fx.deposit).unwrap().len(), 3);
}

#[test]
fn ancestor_ceiling_is_enforced() {
    let config = TreeConfig {
        max_visits: 2,
        ..TreeConfig::default()
    };
    let fx = build_fixture(config);

    assert_eq!(fx.engine.full_path(fx.warehouses[3]).unwrap(), "Site > W04");
    let err = fx.engine.full_path(fx.racks[0]).unwrap_err();
    assert!(matches!(
        err,
        TreeError::CorruptHierarchy { corruption: Corruption::LimitExceeded(2), .. }
    ));
}

// ============================================================================
// create_node / search / describe_location
// ============================================================================

#[test]
fn create_node_validates_input() {
    let fx = fixture();

    let node = fx
        .engine
        .create_node(NewNode::new("  R17 ", "Rack").under(fx.warehouses[0]).with_description(" "))
        .unwrap();
    assert_eq!(node.name, "R17");
    assert_eq!(node.description, None);
    assert_eq!(fx.engine.full_path(node.id).unwrap(), "Site > W01 > R17");

    let err = fx
        .engine
        .create_node(NewNode::new("R01", "Rack").under(fx.warehouses[0]))
        .unwrap_err();
    assert!(matches!(err, TreeError::DuplicateName { .. }));

    let err = fx
        .engine
        .create_node(NewNode::new("X", "Rack").under(NodeId::new(10_000)))
        .unwrap_err();
    assert!(matches!(err, TreeError::NotFound(_)));

    let err = fx.engine.create_node(NewNode::new("   ", "Rack")).unwrap_err();
    assert!(matches!(err, TreeError::InvalidNode(_)));

    // Same name under another parent is allowed
    fx.engine
        .create_node(NewNode::new("R01", "Rack").under(fx.warehouses[1]))
        .unwrap();
}

#[test]
fn search_is_case_insensitive_and_bounded() {
    let fx = fixture();
    let hits = fx.engine.search("r1", None, None).unwrap();
    assert_eq!(names(&hits), vec!["R10", "R11", "R12", "R13", "R14", "R15", "R16"]);

    let scoped = fx.engine.search("0", Some(fx.deposit), Some("Estante")).unwrap();
    assert_eq!(names(&scoped), vec!["E01", "E02"]);

    let bounded = fx.engine.search("0", None, None).unwrap();
    assert_eq!(bounded.len(), SEARCH_LIMIT);

    assert!(fx.engine.search("  ", None, None).unwrap().is_empty());
}

#[test]
fn describe_location_splits_leaf_assets() {
    let fx = fixture();
    let miner = insert(&fx.store, "W01-R01-M001", "Minero", Some(fx.racks[0]));

    let display = fx.engine.describe_location(miner).unwrap();
    assert_eq!(display.location_path, "Site > W01 > R01");
    assert_eq!(display.final_asset.as_deref(), Some("W01-R01-M001"));

    let display = fx.engine.describe_location(fx.racks[0]).unwrap();
    assert_eq!(display.location_path, "Site > W01 > R01");
    assert_eq!(display.final_asset, None);
    assert_eq!(display.node.name, "R01");
}
