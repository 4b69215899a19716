//! Record types

use crate::tree::NodeId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number given to the first work order
pub const FIRST_WORK_ORDER_NUMBER: u64 = 10_000;

/// Number given to the first inventory item
pub const FIRST_INVENTORY_ITEM_NUMBER: u64 = 200_000;

/// Status of a freshly created work order
pub const DEFAULT_WORK_ORDER_STATUS: &str = "Pendiente";

/// Item categories offered by the registration form
pub const ITEM_TYPES: &[&str] = &["Minero", "Cooler", "CB", "Fuente", "Conectores", "Carcaza", "Otro"];

/// Urgency of a work order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criticality {
    Emergencial,
    Urgente,
    Alto,
    Medio,
    Bajo,
}

impl Criticality {
    pub const ALL: [Criticality; 5] = [
        Criticality::Emergencial,
        Criticality::Urgente,
        Criticality::Alto,
        Criticality::Medio,
        Criticality::Bajo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Criticality::Emergencial => "Emergencial",
            Criticality::Urgente => "Urgente",
            Criticality::Alto => "Alto",
            Criticality::Medio => "Medio",
            Criticality::Bajo => "Bajo",
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Criticality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown criticality: {}", s))
    }
}

/// Whether an inventory item works
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationalStatus {
    #[serde(rename = "Funcionando")]
    Working,
    #[serde(rename = "No Funcionando")]
    NotWorking,
}

impl OperationalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationalStatus::Working => "Funcionando",
            OperationalStatus::NotWorking => "No Funcionando",
        }
    }
}

impl std::fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "funcionando" | "working" => Ok(OperationalStatus::Working),
            "no funcionando" | "not-working" | "not_working" => Ok(OperationalStatus::NotWorking),
            other => Err(format!("unknown operational status: {}", other)),
        }
    }
}

/// A stored work order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: i64,
    pub number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub criticality: Criticality,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub location_id: NodeId,
    pub assigned_to: Option<i64>,
    pub created_by: i64,
}

/// Input for creating a work order
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkOrder {
    pub title: String,
    pub description: String,
    pub criticality: Criticality,
    pub due_date: Option<NaiveDate>,
    pub location_id: NodeId,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
}

/// A stored inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub item_number: String,
    pub item_type: String,
    pub serial_number: String,
    pub short_description: String,
    pub detailed_description: String,
    pub operational_status: OperationalStatus,
    pub registered_at: DateTime<Utc>,
    pub quantity: u32,
    pub estimated_price_usd: f64,
    pub registered_by: i64,
    pub location_id: NodeId,
    pub product_id: Option<i64>,
}

impl InventoryItem {
    pub fn estimated_value_usd(&self) -> f64 {
        self.estimated_price_usd * f64::from(self.quantity)
    }
}

/// Input for registering an inventory item
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
    pub item_type: String,
    pub serial_number: String,
    pub short_description: String,
    pub detailed_description: String,
    pub operational_status: OperationalStatus,
    pub quantity: u32,
    pub estimated_price_usd: f64,
    pub registered_by: i64,
    pub location_id: NodeId,
    pub product_id: Option<i64>,
}

/// Work orders sharing one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Inventory aggregate for one location and everything under it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtreeInventory {
    pub location: Option<NodeId>,
    pub items: usize,
    pub units: u64,
    pub value_usd: f64,
}
