//! Node representation in the asset tree

use serde::{Deserialize, Serialize};

/// Unique identifier for a node, assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    /// Wrap a raw row id
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw row id
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::str::FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// One element of the location hierarchy: a site, an area, a warehouse,
/// a rack, a single device or a storage shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier
    pub id: NodeId,
    /// Human-readable label, unique among siblings
    pub name: String,
    /// Free-form classification (e.g. "Rack", "Minero", "Centro de Almacenamiento")
    pub kind: String,
    /// Optional free text
    pub description: Option<String>,
    /// `None` marks a root
    pub parent_id: Option<NodeId>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Label used by pickers: `name (kind)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}

/// A node that has not been inserted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub parent_id: Option<NodeId>,
}

impl NewNode {
    /// Create a root node with the given name and kind
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: None,
            parent_id: None,
        }
    }

    /// Attach the node under a parent
    pub fn under(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
