//! Root scoping: which root nodes a picker may list

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Subset of root nodes visible to a picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootScope {
    /// All roots
    #[default]
    Unscoped,
    /// Sites/areas/racks/equipment, used by work-order location pickers
    OperationalRoots,
    /// Deposits/labs/shelves, used by inventory location pickers
    StorageRoots,
}

impl std::str::FromStr for RootScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "unscoped" => Ok(Self::Unscoped),
            "operational" | "orders" => Ok(Self::OperationalRoots),
            "storage" | "inventory" => Ok(Self::StorageRoots),
            other => Err(format!("unknown root scope: {}", other)),
        }
    }
}

/// Usage class of a node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindClass {
    Operational,
    Storage,
}

/// Classifies kinds into usage classes.
///
/// Classification is total: every kind not listed as storage is operational,
/// so the two root scopes always partition the roots.
#[derive(Debug, Clone, Default)]
pub struct ScopeRules {
    storage_kinds: BTreeSet<String>,
}

impl ScopeRules {
    pub fn new<I, S>(storage_kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            storage_kinds: storage_kinds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, kind: &str) -> KindClass {
        if self.storage_kinds.contains(kind) {
            KindClass::Storage
        } else {
            KindClass::Operational
        }
    }

    /// Whether a root of `kind` is listed under `scope`
    pub fn admits(&self, scope: RootScope, kind: &str) -> bool {
        match scope {
            RootScope::Unscoped => true,
            RootScope::OperationalRoots => self.classify(kind) == KindClass::Operational,
            RootScope::StorageRoots => self.classify(kind) == KindClass::Storage,
        }
    }
}
