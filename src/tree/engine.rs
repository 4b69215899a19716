//! TreeEngine: queries over the asset hierarchy

use super::node::{NewNode, Node, NodeId};
use super::scope::{RootScope, ScopeRules};
use super::traverse::{ancestor_chain, descendant_closure};
use crate::config::TreeConfig;
use crate::storage::{NodeFilter, NodeStore, StorageError};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of hits returned by [`TreeEngine::search`]
pub const SEARCH_LIMIT: usize = 20;

/// What made a traversal give up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    #[error("parent cycle through node {0}")]
    Cycle(NodeId),

    #[error("traversal exceeded {0} visited nodes")]
    LimitExceeded(usize),

    #[error("parent {0} does not exist")]
    DanglingParent(NodeId),
}

/// Errors that can occur in tree operations
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Corrupt hierarchy from node {origin}: {corruption}")]
    CorruptHierarchy { origin: NodeId, corruption: Corruption },

    #[error("Duplicate sibling name: {name}")]
    DuplicateName { name: String, parent_id: Option<NodeId> },

    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// How a selected node is presented as a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationDisplay {
    pub node: Node,
    /// Full path of the location; the parent's path for leaf assets
    pub location_path: String,
    /// Name of the device itself when the node is a leaf asset
    pub final_asset: Option<String>,
}

/// Read and create operations over a [`NodeStore`]
///
/// All reads are side-effect free; traversals are bounded by
/// [`TreeConfig::max_visits`].
#[derive(Clone)]
pub struct TreeEngine {
    store: Arc<dyn NodeStore>,
    config: TreeConfig,
    rules: ScopeRules,
}

impl TreeEngine {
    /// Create an engine with the default configuration
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self::with_config(store, TreeConfig::default())
    }

    pub fn with_config(store: Arc<dyn NodeStore>, config: TreeConfig) -> Self {
        let rules = ScopeRules::new(config.storage_root_kinds.iter().cloned());
        Self { store, config, rules }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn rules(&self) -> &ScopeRules {
        &self.rules
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    pub fn get_node(&self, id: NodeId) -> TreeResult<Option<Node>> {
        Ok(self.store.get_node(id)?)
    }

    /// Like [`get_node`](Self::get_node) but a missing node is `NotFound`
    pub fn require_node(&self, id: NodeId) -> TreeResult<Node> {
        self.get_node(id)?.ok_or(TreeError::NotFound(id))
    }

    pub fn count(&self) -> TreeResult<usize> {
        Ok(self.store.count_nodes()?)
    }

    /// Direct children of `parent_id`, or the roots admitted by `scope`.
    ///
    /// Ordered by name (ties by id) so index-based pickers stay stable
    /// between calls. `scope` only applies at the root level.
    pub fn children_of(&self, parent_id: Option<NodeId>, scope: RootScope) -> TreeResult<Vec<Node>> {
        let mut nodes = self.store.find_nodes(parent_id)?;
        if parent_id.is_none() {
            nodes.retain(|node| self.rules.admits(scope, &node.kind));
        }
        nodes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(nodes)
    }

    /// The nodes from the root down to `id`, inclusive
    pub fn ancestors(&self, id: NodeId) -> TreeResult<Vec<Node>> {
        ancestor_chain(self.store.as_ref(), id, self.config.max_visits)
    }

    /// Names from the root down to `id` joined by the path separator
    pub fn full_path(&self, id: NodeId) -> TreeResult<String> {
        let names: Vec<String> = self.ancestors(id)?.into_iter().map(|n| n.name).collect();
        Ok(names.join(&self.config.path_separator))
    }

    /// `None` means nothing is selected and renders as an empty path
    pub fn full_path_opt(&self, id: Option<NodeId>) -> TreeResult<String> {
        match id {
            Some(id) => self.full_path(id),
            None => Ok(String::new()),
        }
    }

    /// Ids of `root` and every node below it.
    ///
    /// An id that does not resolve to a node yields the empty set.
    pub fn descendant_ids(&self, root: NodeId) -> TreeResult<HashSet<NodeId>> {
        if self.store.get_node(root)?.is_none() {
            return Ok(HashSet::new());
        }
        descendant_closure(self.store.as_ref(), root, self.config.max_visits)
    }

    pub fn descendant_ids_opt(&self, root: Option<NodeId>) -> TreeResult<HashSet<NodeId>> {
        match root {
            Some(root) => self.descendant_ids(root),
            None => Ok(HashSet::new()),
        }
    }

    /// Administrative creation of a single node
    pub fn create_node(&self, new: NewNode) -> TreeResult<Node> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(TreeError::InvalidNode("name must not be empty".to_string()));
        }
        let kind = new.kind.trim().to_string();
        if kind.is_empty() {
            return Err(TreeError::InvalidNode("kind must not be empty".to_string()));
        }

        if let Some(parent_id) = new.parent_id {
            self.require_node(parent_id)?;
        }

        let siblings = self.store.find_nodes(new.parent_id)?;
        if siblings.iter().any(|s| s.name == name) {
            return Err(TreeError::DuplicateName {
                name,
                parent_id: new.parent_id,
            });
        }

        let node = NewNode {
            name,
            kind,
            description: new.description.filter(|d| !d.trim().is_empty()),
            parent_id: new.parent_id,
        };
        let id = self.store.insert_node(&node)?;
        tracing::debug!(%id, name = %node.name, kind = %node.kind, "created node");

        Ok(Node {
            id,
            name: node.name,
            kind: node.kind,
            description: node.description,
            parent_id: node.parent_id,
        })
    }

    /// Case-insensitive name search, at most [`SEARCH_LIMIT`] hits.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str, parent_id: Option<NodeId>, kind: Option<&str>) -> TreeResult<Vec<Node>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut filter = NodeFilter::new().with_name(query).with_limit(SEARCH_LIMIT);
        if let Some(parent_id) = parent_id {
            filter = filter.with_parent(parent_id);
        }
        if let Some(kind) = kind {
            filter = filter.with_kind(kind);
        }
        Ok(self.store.search_nodes(&filter)?)
    }

    /// Split a node into location and final asset for display.
    ///
    /// Leaf assets (e.g. a single miner) are shown under their parent's
    /// location; any other node is itself the location.
    pub fn describe_location(&self, id: NodeId) -> TreeResult<LocationDisplay> {
        let mut chain = self.ancestors(id)?;
        let node = chain.pop().ok_or(TreeError::NotFound(id))?;

        let join = |nodes: &[Node]| {
            nodes
                .iter()
                .map(|n| n.name.as_str())
                .collect::<Vec<_>>()
                .join(&self.config.path_separator)
        };

        if self.config.is_leaf_asset(&node.kind) {
            Ok(LocationDisplay {
                location_path: join(&chain),
                final_asset: Some(node.name.clone()),
                node,
            })
        } else {
            chain.push(node.clone());
            Ok(LocationDisplay {
                location_path: join(&chain),
                final_asset: None,
                node,
            })
        }
    }
}

impl std::fmt::Debug for TreeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
