//! Engine configuration
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default ceiling on nodes visited by a single traversal
pub const DEFAULT_MAX_VISITS: usize = 100_000;

/// Default ceiling on drill-down levels rendered by a selector
pub const DEFAULT_MAX_SELECTOR_DEPTH: usize = 10;

/// Default separator between names in a full path
pub const DEFAULT_PATH_SEPARATOR: &str = " > ";

/// Root kinds that belong to the inventory storage hierarchy
pub const DEFAULT_STORAGE_ROOT_KINDS: &[&str] =
    &["Centro de Almacenamiento", "Centro de Pruebas", "Estante"];

/// Kinds that denote a single device rather than a location
pub const DEFAULT_LEAF_ASSET_KINDS: &[&str] = &["Minero"];

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the tree engine and selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Safety bound for ancestor walks and descendant closures
    pub max_visits: usize,
    /// Hard depth ceiling for the cascading selector
    pub max_selector_depth: usize,
    /// Separator used to render full paths
    pub path_separator: String,
    /// Root kinds exposed to inventory pickers; all other kinds are operational
    pub storage_root_kinds: Vec<String>,
    /// Kinds rendered as "final asset" under their parent's location
    pub leaf_asset_kinds: Vec<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_visits: DEFAULT_MAX_VISITS,
            max_selector_depth: DEFAULT_MAX_SELECTOR_DEPTH,
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            storage_root_kinds: DEFAULT_STORAGE_ROOT_KINDS.iter().map(|k| k.to_string()).collect(),
            leaf_asset_kinds: DEFAULT_LEAF_ASSET_KINDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl TreeConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document, which should mean "all defaults"
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_visits == 0 {
            return Err(ConfigError::Invalid("max_visits must be positive".to_string()));
        }
        if self.max_selector_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_selector_depth must be positive".to_string(),
            ));
        }
        if self.path_separator.is_empty() {
            return Err(ConfigError::Invalid("path_separator must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn is_leaf_asset(&self, kind: &str) -> bool {
        self.leaf_asset_kinds.iter().any(|k| k == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = TreeConfig::from_yaml_str("").unwrap();
        assert_eq!(config, TreeConfig::default());
        assert_eq!(config.max_visits, 100_000);
        assert_eq!(config.max_selector_depth, 10);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = TreeConfig::from_yaml_str("max_visits: 500\npath_separator: \" / \"\n").unwrap();
        assert_eq!(config.max_visits, 500);
        assert_eq!(config.path_separator, " / ");
        assert_eq!(config.max_selector_depth, DEFAULT_MAX_SELECTOR_DEPTH);
        assert!(config.storage_root_kinds.contains(&"Estante".to_string()));
    }

    #[test]
    fn zero_bounds_are_rejected() {
        let err = TreeConfig::from_yaml_str("max_visits: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = TreeConfig::from_yaml_str("max_selector_depth: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = TreeConfig::from_yaml_str("max_visits: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn leaf_asset_kinds() {
        let config = TreeConfig::default();
        assert!(config.is_leaf_asset("Minero"));
        assert!(!config.is_leaf_asset("Rack"));
    }
}
