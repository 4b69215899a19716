//! Transport-independent API layer.
//!
//! `AssetApi` is the single entry point for front ends. It owns the
//! [`TreeEngine`] and the record store, validates that records point at
//! existing nodes, allocates record numbers and scopes listings and reports
//! to subtrees of the location tree.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::config::TreeConfig;
use crate::records::{
    InventoryItem, NewInventoryItem, NewWorkOrder, StatusCount, SubtreeInventory, WorkOrder,
    FIRST_INVENTORY_ITEM_NUMBER, FIRST_WORK_ORDER_NUMBER,
};
use crate::selector::Selector;
use crate::storage::{RecordStore, StorageError};
use crate::tree::{LocationDisplay, NodeId, RootScope, TreeEngine, TreeError};

/// Errors from [`AssetApi`] operations
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Location {0} does not exist")]
    InvalidLocation(NodeId),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Single entry point for all consumer-facing operations.
#[derive(Clone)]
pub struct AssetApi {
    engine: TreeEngine,
    records: Arc<dyn RecordStore>,
}

impl AssetApi {
    /// Create an API over `store` with the default configuration.
    pub fn new<S: RecordStore + 'static>(store: Arc<S>) -> Self {
        Self::with_config(store, TreeConfig::default())
    }

    pub fn with_config<S: RecordStore + 'static>(store: Arc<S>, config: TreeConfig) -> Self {
        let engine = TreeEngine::with_config(store.clone(), config);
        Self { engine, records: store }
    }

    pub fn engine(&self) -> &TreeEngine {
        &self.engine
    }

    /// A location picker over this API's tree
    pub fn selector(&self, scope: RootScope) -> Selector<'_> {
        Selector::new(&self.engine, scope)
    }

    pub fn describe_location(&self, id: NodeId) -> ApiResult<LocationDisplay> {
        Ok(self.engine.describe_location(id)?)
    }

    // --- Work orders ---

    /// The number the next work order will get
    pub fn next_work_order_number(&self) -> ApiResult<String> {
        let last = self.records.last_work_order_number()?;
        Ok(next_number(last.as_deref(), FIRST_WORK_ORDER_NUMBER))
    }

    pub fn create_work_order(&self, order: NewWorkOrder) -> ApiResult<WorkOrder> {
        let order = NewWorkOrder {
            title: required(order.title, "title")?,
            description: required(order.description, "description")?,
            ..order
        };
        self.check_location(order.location_id)?;

        let number = self.next_work_order_number()?;
        let created = self.records.insert_work_order(&number, &order)?;
        tracing::info!(number = %created.number, location = %created.location_id, "work order created");
        Ok(created)
    }

    /// Work orders, newest first, optionally restricted to a status and to
    /// the subtree under `location`.
    pub fn list_work_orders(
        &self,
        status: Option<&str>,
        location: Option<NodeId>,
    ) -> ApiResult<Vec<WorkOrder>> {
        let mut orders = self.records.list_work_orders(status)?;
        if let Some(scope) = self.subtree(location)? {
            orders.retain(|o| scope.contains(&o.location_id));
        }
        Ok(orders)
    }

    pub fn get_work_order(&self, id: i64) -> ApiResult<WorkOrder> {
        self.records
            .get_work_order(id)?
            .ok_or_else(|| ApiError::RecordNotFound(format!("work order {}", id)))
    }

    pub fn update_work_order_status(&self, id: i64, status: &str) -> ApiResult<WorkOrder> {
        let status = required(status.to_string(), "status")?;
        let order = self
            .records
            .set_work_order_status(id, &status)?
            .ok_or_else(|| ApiError::RecordNotFound(format!("work order {}", id)))?;
        tracing::info!(number = %order.number, status = %order.status, "work order status changed");
        Ok(order)
    }

    pub fn assign_work_order(&self, id: i64, user_id: i64) -> ApiResult<WorkOrder> {
        self.records
            .assign_work_order(id, user_id)?
            .ok_or_else(|| ApiError::RecordNotFound(format!("work order {}", id)))
    }

    // --- Inventory ---

    /// The number the next inventory item will get
    pub fn next_inventory_item_number(&self) -> ApiResult<String> {
        let last = self.records.last_inventory_item_number()?;
        Ok(next_number(last.as_deref(), FIRST_INVENTORY_ITEM_NUMBER))
    }

    pub fn create_inventory_item(&self, item: NewInventoryItem) -> ApiResult<InventoryItem> {
        let item = NewInventoryItem {
            item_type: required(item.item_type, "item_type")?,
            serial_number: required(item.serial_number, "serial_number")?,
            short_description: required(item.short_description, "short_description")?,
            ..item
        };
        if item.quantity < 1 {
            return Err(ApiError::InvalidValue("quantity must be at least 1".to_string()));
        }
        if !item.estimated_price_usd.is_finite() || item.estimated_price_usd < 0.0 {
            return Err(ApiError::InvalidValue(format!(
                "estimated price must be a non-negative amount, got {}",
                item.estimated_price_usd
            )));
        }
        self.check_location(item.location_id)?;

        let number = self.next_inventory_item_number()?;
        let created = self.records.insert_inventory_item(&number, &item)?;
        tracing::info!(
            item_number = %created.item_number,
            serial = %created.serial_number,
            location = %created.location_id,
            "inventory item registered"
        );
        Ok(created)
    }

    /// Inventory items, newest first, optionally filtered by a fragment of
    /// the item number and by the subtree under `location`.
    pub fn list_inventory_items(
        &self,
        number_contains: Option<&str>,
        location: Option<NodeId>,
    ) -> ApiResult<Vec<InventoryItem>> {
        let number_contains = number_contains.map(str::trim).filter(|s| !s.is_empty());
        let mut items = self.records.list_inventory_items(number_contains)?;
        if let Some(scope) = self.subtree(location)? {
            items.retain(|i| scope.contains(&i.location_id));
        }
        Ok(items)
    }

    /// Look an item up by serial number, falling back to item number
    pub fn find_inventory_item(&self, serial_or_number: &str) -> ApiResult<Option<InventoryItem>> {
        let key = serial_or_number.trim();
        if key.is_empty() {
            return Ok(None);
        }
        Ok(self.records.find_inventory_item(key)?)
    }

    // --- Reports ---

    /// Work orders per status, ordered by status
    pub fn work_order_status_report(&self, location: Option<NodeId>) -> ApiResult<Vec<StatusCount>> {
        if location.is_none() {
            return Ok(self.records.work_order_status_counts()?);
        }

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for order in self.list_work_orders(None, location)? {
            *counts.entry(order.status).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    /// Item count, units and estimated value stored under `location`
    pub fn inventory_report(&self, location: Option<NodeId>) -> ApiResult<SubtreeInventory> {
        let items = self.list_inventory_items(None, location)?;
        Ok(SubtreeInventory {
            location,
            items: items.len(),
            units: items.iter().map(|i| u64::from(i.quantity)).sum(),
            value_usd: items.iter().map(InventoryItem::estimated_value_usd).sum(),
        })
    }

    // --- Internal ---

    fn check_location(&self, id: NodeId) -> ApiResult<()> {
        match self.engine.get_node(id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::InvalidLocation(id)),
        }
    }

    /// `None` for no location filter; a location that does not exist
    /// yields an empty scope.
    fn subtree(&self, location: Option<NodeId>) -> ApiResult<Option<HashSet<NodeId>>> {
        match location {
            Some(id) => Ok(Some(self.engine.descendant_ids(id)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for AssetApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetApi")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// Last number plus one, or `first` when there is no numeric last number
fn next_number(last: Option<&str>, first: u64) -> String {
    last.and_then(|n| n.trim().parse::<u64>().ok())
        .and_then(|n| n.checked_add(1))
        .unwrap_or(first)
        .to_string()
}

fn required(value: String, field: &'static str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
