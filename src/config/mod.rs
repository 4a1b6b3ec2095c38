//! Configuration
//!
//! `CatalogConfig` is assembled from built-in defaults, the global config file,
//! the workspace config file and `BRICKGRAPH__*` environment variables, in that
//! order of precedence (lowest first).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod workspace;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use workspace::storage_paths::{StorageBackend, StorageConfig};

use crate::logging::LoggingConfig;
use crate::types::{CategoryId, ItemId};
use serde::{Deserialize, Serialize};

/// File name of the workspace-level config file
pub const WORKSPACE_CONFIG_FILE: &str = "brickgraph.toml";

fn default_root_id() -> CategoryId {
    CategoryId(1)
}

fn default_root_name() -> String {
    "BRICK Database".to_string()
}

fn default_root_item_id() -> String {
    "1".to_string()
}

fn default_color() -> String {
    "Default".to_string()
}

/// Catalog-wide constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Distinguished root category
    #[serde(default = "default_root_id")]
    pub root_id: CategoryId,

    /// Name given to the root category when it is created
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Item whose detail lists images as a color map instead of a list
    #[serde(default = "default_root_item_id")]
    pub root_item_id: String,

    /// Color used for composition edges and images loaded without one
    #[serde(default = "default_color")]
    pub default_color: String,
}

impl CatalogSettings {
    pub fn root_item(&self) -> ItemId {
        ItemId::new(self.root_item_id.clone())
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            root_id: default_root_id(),
            root_name: default_root_name(),
            root_item_id: default_root_item_id(),
            default_color: default_color(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CatalogConfig {
    /// Render as TOML, used for starter config files
    pub fn to_toml(&self) -> Result<String, crate::error::CatalogError> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::error::CatalogError::ConfigError(e.to_string()))
    }
}
