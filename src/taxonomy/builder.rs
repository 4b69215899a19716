//! Transactional, idempotent taxonomy population

use super::table::{PlannedNode, TaxonomyTable};
use super::TaxonomyError;
use crate::storage::NodeStore;
use crate::tree::{NewNode, NodeId};
use serde::Serialize;
use std::sync::Arc;

/// Result of a [`TaxonomyBuilder::populate`] run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BuildOutcome {
    /// The table was expanded and stored
    Populated { nodes: usize },
    /// The store already held nodes; nothing was written
    AlreadyPopulated { existing: usize },
}

/// Loads a [`TaxonomyTable`] into a store.
///
/// Callers must hold exclusive access to the store for the duration of
/// [`populate`](Self::populate); the emptiness check and the inserts are
/// not atomic with respect to other writers.
pub struct TaxonomyBuilder {
    store: Arc<dyn NodeStore>,
}

impl TaxonomyBuilder {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Populate an empty store from `table`.
    ///
    /// Either every planned node is stored or none is: any failure rolls
    /// the transaction back and returns the first error.
    pub fn populate(&self, table: &TaxonomyTable) -> Result<BuildOutcome, TaxonomyError> {
        let existing = self.store.count_nodes()?;
        if existing > 0 {
            tracing::info!(existing, "taxonomy already populated, skipping");
            return Ok(BuildOutcome::AlreadyPopulated { existing });
        }

        let plan = table.expand()?;
        tracing::info!(nodes = plan.len(), "populating taxonomy");

        self.store.begin()?;
        match self.insert_plan(&plan) {
            Ok(()) => {
                self.store.commit()?;
                tracing::info!(nodes = plan.len(), "taxonomy committed");
                Ok(BuildOutcome::Populated { nodes: plan.len() })
            }
            Err(err) => {
                tracing::error!(error = %err, "taxonomy load failed, rolling back");
                if let Err(rollback_err) = self.store.rollback() {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    fn insert_plan(&self, plan: &[PlannedNode]) -> Result<(), TaxonomyError> {
        let mut ids: Vec<NodeId> = Vec::with_capacity(plan.len());
        for planned in plan {
            let parent_id = match planned.parent {
                Some(index) => Some(*ids.get(index).ok_or_else(|| {
                    TaxonomyError::InvalidTable(format!(
                        "'{}' refers to parent #{} before it exists",
                        planned.name, index
                    ))
                })?),
                None => None,
            };
            let node = NewNode {
                name: planned.name.clone(),
                kind: planned.kind.clone(),
                description: planned.description.clone(),
                parent_id,
            };
            ids.push(self.store.insert_node(&node)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{OpenStore, SqliteStore};
    use crate::taxonomy::LevelSpec;
    use crate::tree::{RootScope, TreeEngine};

    fn store() -> Arc<SqliteStore> {
        Arc::new(SqliteStore::open_in_memory().unwrap())
    }

    fn small_table() -> TaxonomyTable {
        TaxonomyTable::new(vec![LevelSpec::new("Site", "Warehouse").child(
            LevelSpec::new("W{n:02}", "Rack")
                .count(2)
                .lineage()
                .child(LevelSpec::new("{lineage}-M{n:02}", "Minero").count(3)),
        )])
    }

    #[test]
    fn populates_an_empty_store() {
        let store = store();
        let builder = TaxonomyBuilder::new(store.clone());

        let outcome = builder.populate(&small_table()).unwrap();
        assert_eq!(outcome, BuildOutcome::Populated { nodes: 9 });

        let engine = TreeEngine::new(store);
        let roots = engine.children_of(None, RootScope::Unscoped).unwrap();
        assert_eq!(roots.len(), 1);
        let racks = engine.children_of(Some(roots[0].id), RootScope::Unscoped).unwrap();
        assert_eq!(racks.len(), 2);
        let miners = engine.children_of(Some(racks[1].id), RootScope::Unscoped).unwrap();
        assert_eq!(engine.full_path(miners[2].id).unwrap(), "Site > W02 > W02-M03");
    }

    #[test]
    fn second_run_is_a_no_op() {
        let store = store();
        let builder = TaxonomyBuilder::new(store.clone());
        builder.populate(&small_table()).unwrap();

        let outcome = builder.populate(&small_table()).unwrap();
        assert_eq!(outcome, BuildOutcome::AlreadyPopulated { existing: 9 });
        assert_eq!(store.count_nodes().unwrap(), 9);
    }

    #[test]
    fn failed_load_leaves_the_store_empty() {
        let store = store();
        let builder = TaxonomyBuilder::new(store.clone());

        // Both racks render as "W", which collides on the sibling-name index.
        let table = TaxonomyTable::new(vec![LevelSpec::new("Site", "Warehouse")
            .child(LevelSpec::new("W", "Rack").count(2))]);

        let err = builder.populate(&table).unwrap_err();
        assert!(matches!(err, TaxonomyError::Storage(_)));
        assert_eq!(store.count_nodes().unwrap(), 0);

        // The store is usable after the rollback.
        builder.populate(&small_table()).unwrap();
        assert_eq!(store.count_nodes().unwrap(), 9);
    }

    #[test]
    fn invalid_table_writes_nothing() {
        let store = store();
        let builder = TaxonomyBuilder::new(store.clone());
        let table = TaxonomyTable::new(vec![LevelSpec::new("Site {bogus}", "Warehouse")]);

        assert!(matches!(
            builder.populate(&table),
            Err(TaxonomyError::Template { .. })
        ));
        assert_eq!(store.count_nodes().unwrap(), 0);
    }
}
