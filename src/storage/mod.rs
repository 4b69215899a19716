//! Storage backends for the asset tree
//!
//! Engines talk to storage only through the `NodeStore` and `RecordStore`
//! traits. The primary implementation is `SqliteStore`.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{NodeFilter, NodeStore, OpenStore, RecordStore, StorageError, StorageResult};
