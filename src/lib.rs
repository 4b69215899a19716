//! asset-tree: hierarchical asset and location tracking
//!
//! A self-referencing tree of asset nodes (sites, areas, warehouses,
//! racks, containers, individual miners, plus storage deposits and shelves)
//! with the records that hang off it.
//!
//! # Core Concepts
//!
//! - **Nodes**: one entry per physical location or asset, linked to a parent
//! - **Root scope**: root kinds are split into operational and storage
//!   classes so each picker only offers its own roots
//! - **Taxonomy**: a declarative fan-out table bulk-loaded once into an
//!   empty store
//! - **Selector**: explicit state for the cascading "pick a level, then the
//!   next" location chooser
//! - **Records**: work orders and inventory items that point at one node and
//!   are listed per subtree
//!
//! # Example
//!
//! ```
//! use asset_tree::{NewNode, OpenStore, RootScope, SqliteStore, TreeEngine};
//! use std::sync::Arc;
//!
//! let engine = TreeEngine::new(Arc::new(SqliteStore::open_in_memory().unwrap()));
//! let site = engine.create_node(NewNode::new("Site", "Warehouse")).unwrap();
//! let w01 = engine.create_node(NewNode::new("W01", "Rack").under(site.id)).unwrap();
//!
//! assert_eq!(engine.full_path(w01.id).unwrap(), "Site > W01");
//! assert_eq!(engine.children_of(None, RootScope::OperationalRoots).unwrap().len(), 1);
//! ```

pub mod api;
pub mod config;
pub mod records;
pub mod selector;
pub mod storage;
pub mod taxonomy;
pub mod tree;

pub use api::{ApiError, ApiResult, AssetApi};
pub use config::{ConfigError, TreeConfig};
pub use selector::{Selector, SelectorLevel, SelectorState, SelectorWalk};
pub use storage::{NodeStore, OpenStore, RecordStore, SqliteStore, StorageError, StorageResult};
pub use taxonomy::{default_table, BuildOutcome, TaxonomyBuilder, TaxonomyError, TaxonomyTable};
pub use tree::{NewNode, Node, NodeId, RootScope, TreeEngine, TreeError, TreeResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
