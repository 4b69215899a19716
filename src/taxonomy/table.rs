//! Declarative fan-out tables and their deterministic expansion

use super::template::{render, TemplateVars};
use super::TaxonomyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Deepest level nesting accepted in a table
pub const MAX_TABLE_DEPTH: usize = 32;

/// How many nodes a level spec produces under each parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FanOut {
    /// The same count under every parent
    Fixed(usize),
    /// `counts[k - 1]` under the parent whose ordinal is `k`
    PerParent(Vec<usize>),
}

impl Default for FanOut {
    fn default() -> Self {
        FanOut::Fixed(1)
    }
}

impl FanOut {
    fn for_parent(&self, parent_ordinal: usize) -> Option<usize> {
        match self {
            FanOut::Fixed(n) => Some(*n),
            FanOut::PerParent(counts) => parent_ordinal.checked_sub(1).and_then(|i| counts.get(i).copied()),
        }
    }
}

/// Where ordinals restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Numbering {
    /// Restart at 1 under every parent
    #[default]
    Local,
    /// Continue across every parent expanded from the same spec
    Global,
}

/// One level of the taxonomy and the levels nested under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Name template
    pub name: String,
    pub kind: String,
    /// Description template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub count: FanOut,
    #[serde(default)]
    pub numbering: Numbering,
    /// Whether this level's names feed `{lineage}` below it
    #[serde(default)]
    pub lineage: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LevelSpec>,
}

impl LevelSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: None,
            count: FanOut::default(),
            numbering: Numbering::default(),
            lineage: false,
            children: Vec::new(),
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = FanOut::Fixed(count);
        self
    }

    pub fn counts(mut self, counts: Vec<usize>) -> Self {
        self.count = FanOut::PerParent(counts);
        self
    }

    pub fn global(mut self) -> Self {
        self.numbering = Numbering::Global;
        self
    }

    pub fn lineage(mut self) -> Self {
        self.lineage = true;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn child(mut self, child: LevelSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// A node produced by expansion, not yet stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNode {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    /// Index of the parent in the plan; always smaller than this node's index
    pub parent: Option<usize>,
}

/// The complete fan-out specification of a taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxonomyTable {
    pub roots: Vec<LevelSpec>,
}

impl TaxonomyTable {
    pub fn new(roots: Vec<LevelSpec>) -> Self {
        Self { roots }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, TaxonomyError> {
        let table: Self = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Structural checks that do not need expansion
    pub fn validate(&self) -> Result<(), TaxonomyError> {
        if self.roots.is_empty() {
            return Err(TaxonomyError::InvalidTable("table has no roots".to_string()));
        }
        let mut stack: Vec<(&LevelSpec, usize)> = self.roots.iter().map(|s| (s, 1)).collect();
        while let Some((spec, depth)) = stack.pop() {
            if depth > MAX_TABLE_DEPTH {
                return Err(TaxonomyError::InvalidTable(format!(
                    "nesting deeper than {} levels",
                    MAX_TABLE_DEPTH
                )));
            }
            if spec.name.trim().is_empty() || spec.kind.trim().is_empty() {
                return Err(TaxonomyError::InvalidTable(
                    "every level needs a name and a kind".to_string(),
                ));
            }
            stack.extend(spec.children.iter().map(|c| (c, depth + 1)));
        }
        Ok(())
    }

    /// Expand the table into concrete nodes in pre-order.
    ///
    /// The same table always yields the same plan.
    pub fn expand(&self) -> Result<Vec<PlannedNode>, TaxonomyError> {
        self.validate()?;

        let mut expansion = Expansion::default();
        let mut spec_path = Vec::new();
        for (i, spec) in self.roots.iter().enumerate() {
            spec_path.push(i);
            expansion.expand_level(spec, &mut spec_path, None, 1, &[])?;
            spec_path.pop();
        }
        Ok(expansion.plan)
    }
}

#[derive(Default)]
struct Expansion {
    plan: Vec<PlannedNode>,
    /// Running ordinal per globally numbered spec, keyed by its position in the table
    global_ordinals: HashMap<Vec<usize>, usize>,
}

impl Expansion {
    fn expand_level(
        &mut self,
        spec: &LevelSpec,
        spec_path: &mut Vec<usize>,
        parent: Option<usize>,
        parent_ordinal: usize,
        lineage: &[String],
    ) -> Result<(), TaxonomyError> {
        let count = spec.count.for_parent(parent_ordinal).ok_or_else(|| {
            TaxonomyError::InvalidTable(format!(
                "level '{}' has no count for parent #{}",
                spec.name, parent_ordinal
            ))
        })?;
        let parent_name = parent.map(|i| self.plan[i].name.clone());

        for local in 1..=count {
            let ordinal = match spec.numbering {
                Numbering::Local => local,
                Numbering::Global => {
                    let counter = self.global_ordinals.entry(spec_path.clone()).or_insert(0);
                    *counter += 1;
                    *counter
                }
            };

            let vars = TemplateVars {
                ordinal,
                name: None,
                parent: parent_name.as_deref(),
                lineage,
            };
            let name = render(&spec.name, &vars)?;
            if name.trim().is_empty() {
                return Err(TaxonomyError::InvalidTable(format!(
                    "template '{}' rendered an empty name",
                    spec.name
                )));
            }
            let description = spec
                .description
                .as_deref()
                .map(|d| render(d, &TemplateVars { name: Some(&name), ..vars }))
                .transpose()?;

            let index = self.plan.len();
            self.plan.push(PlannedNode {
                name,
                kind: spec.kind.clone(),
                description,
                parent,
            });

            if spec.children.is_empty() {
                continue;
            }

            let mut child_lineage = lineage.to_vec();
            if spec.lineage {
                child_lineage.push(self.plan[index].name.clone());
            }
            for (ci, child) in spec.children.iter().enumerate() {
                spec_path.push(ci);
                self.expand_level(child, spec_path, Some(index), ordinal, &child_lineage)?;
                spec_path.pop();
            }
        }

        Ok(())
    }
}
