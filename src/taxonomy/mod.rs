//! Taxonomy builder: bulk-load a site hierarchy from a declarative table
//!
//! A [`TaxonomyTable`] describes levels, fan-out counts and name templates.
//! [`TaxonomyBuilder::populate`] expands it and inserts every node in one
//! transaction, doing nothing when the store already holds nodes.

mod builder;
mod table;
mod template;

pub use builder::{BuildOutcome, TaxonomyBuilder};
pub use table::{FanOut, LevelSpec, Numbering, PlannedNode, TaxonomyTable, MAX_TABLE_DEPTH};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur while building a taxonomy
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Invalid taxonomy table: {0}")]
    InvalidTable(String),

    #[error("Template error in '{template}': {message}")]
    Template { template: String, message: String },

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

const HIVE_SITE_YAML: &str = include_str!("hive_site.yaml");

/// The bundled site taxonomy: aerial warehouses, hydro-container platforms
/// and the storage locations.
pub fn default_table() -> Result<TaxonomyTable, TaxonomyError> {
    TaxonomyTable::from_yaml_str(HIVE_SITE_YAML)
}
