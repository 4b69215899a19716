//! Work orders and inventory items
//!
//! Both record types hold a non-owning reference to exactly one node, their
//! location. Validation of that reference and number allocation happen in
//! [`crate::api::AssetApi`]; the types here are plain data.

mod types;

pub use types::{
    Criticality, InventoryItem, NewInventoryItem, NewWorkOrder, OperationalStatus, StatusCount,
    SubtreeInventory, WorkOrder, DEFAULT_WORK_ORDER_STATUS, FIRST_INVENTORY_ITEM_NUMBER,
    FIRST_WORK_ORDER_NUMBER, ITEM_TYPES,
};
