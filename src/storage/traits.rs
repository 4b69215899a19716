//! Storage trait definitions

use crate::records::{
    InventoryItem, NewInventoryItem, NewWorkOrder, StatusCount, WorkOrder,
};
use crate::tree::{NewNode, Node, NodeId};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// A uniqueness or foreign-key constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::ConstraintViolation(message.unwrap_or_else(|| code.to_string()))
            }
            other => StorageError::Database(other),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Filter criteria for searching nodes by name
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    /// Case-insensitive substring of the node name
    pub name_contains: Option<String>,
    /// Restrict to direct children of this node
    pub parent_id: Option<NodeId>,
    /// Restrict to this kind
    pub kind: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl NodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    pub fn with_parent(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Persistence contract for asset nodes
///
/// Pure storage: no tree logic lives here. Implementations must be
/// thread-safe (Send + Sync) so engines can share them behind an `Arc`.
pub trait NodeStore: Send + Sync {
    // === Node Operations ===

    /// Insert a node and return its assigned id
    fn insert_node(&self, node: &NewNode) -> StorageResult<NodeId>;

    /// Load a node by ID
    fn get_node(&self, id: NodeId) -> StorageResult<Option<Node>>;

    /// Nodes whose parent is `parent_id` (`None` = roots), unfiltered by kind
    fn find_nodes(&self, parent_id: Option<NodeId>) -> StorageResult<Vec<Node>>;

    /// Ids of the direct children of a node
    fn child_ids(&self, parent_id: NodeId) -> StorageResult<Vec<NodeId>>;

    /// Search nodes matching filter criteria
    fn search_nodes(&self, filter: &NodeFilter) -> StorageResult<Vec<Node>>;

    /// Total number of nodes
    fn count_nodes(&self) -> StorageResult<usize>;

    // === Transaction Boundary ===

    fn begin(&self) -> StorageResult<()>;

    fn commit(&self) -> StorageResult<()>;

    fn rollback(&self) -> StorageResult<()>;
}

/// Persistence contract for records that point at a node
pub trait RecordStore: NodeStore {
    // === Work Orders ===

    /// Insert a work order under an already allocated number
    fn insert_work_order(&self, number: &str, order: &NewWorkOrder) -> StorageResult<WorkOrder>;

    /// Number of the most recently inserted work order
    fn last_work_order_number(&self) -> StorageResult<Option<String>>;

    fn get_work_order(&self, id: i64) -> StorageResult<Option<WorkOrder>>;

    /// Newest first, optionally restricted to one status
    fn list_work_orders(&self, status: Option<&str>) -> StorageResult<Vec<WorkOrder>>;

    fn set_work_order_status(&self, id: i64, status: &str) -> StorageResult<Option<WorkOrder>>;

    fn assign_work_order(&self, id: i64, user_id: i64) -> StorageResult<Option<WorkOrder>>;

    fn work_order_status_counts(&self) -> StorageResult<Vec<StatusCount>>;

    // === Inventory Items ===

    /// Insert an inventory item under an already allocated item number
    fn insert_inventory_item(
        &self,
        item_number: &str,
        item: &NewInventoryItem,
    ) -> StorageResult<InventoryItem>;

    /// Item number of the most recently inserted item
    fn last_inventory_item_number(&self) -> StorageResult<Option<String>>;

    /// Newest first, optionally restricted to item numbers containing a fragment
    fn list_inventory_items(&self, number_contains: Option<&str>) -> StorageResult<Vec<InventoryItem>>;

    /// Look up an item by serial number, falling back to item number
    fn find_inventory_item(&self, serial_or_number: &str) -> StorageResult<Option<InventoryItem>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
