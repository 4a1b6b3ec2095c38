//! XDG Base Directory utilities for workspace data management.

use crate::error::CatalogError;
use std::path::{Component, Path, PathBuf};

const APP_DIR: &str = "brickgraph";

/// Get XDG data home directory
///
/// Returns `$XDG_DATA_HOME` if set, otherwise defaults to `$HOME/.local/share`
pub fn data_home() -> Option<PathBuf> {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg_data_home));
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local").join("share"))
}

/// Get the data directory for a specific workspace
///
/// Returns `$XDG_DATA_HOME/brickgraph/<workspace_path>/`. The canonical
/// workspace path is mirrored as a directory structure, so
/// `/home/user/catalog` becomes `$XDG_DATA_HOME/brickgraph/home/user/catalog/`.
pub fn workspace_data_dir(workspace_root: &Path) -> Result<PathBuf, CatalogError> {
    let data_home = data_home().ok_or_else(|| {
        CatalogError::ConfigError(
            "Could not determine XDG data home directory (HOME not set)".to_string(),
        )
    })?;

    let canonical = workspace_root.canonicalize().map_err(|e| {
        CatalogError::ConfigError(format!("Failed to canonicalize workspace path: {}", e))
    })?;

    Ok(mirror_path(data_home.join(APP_DIR), &canonical))
}

/// Append the normal components of `path` to `base`
pub(crate) fn mirror_path(base: PathBuf, path: &Path) -> PathBuf {
    path.components().fold(base, |acc, component| match component {
        Component::Normal(name) => acc.join(name),
        Component::RootDir | Component::Prefix(_) | Component::CurDir | Component::ParentDir => {
            acc
        }
    })
}

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, CatalogError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config_home));
    }

    let home = std::env::var("HOME").map_err(|_| {
        CatalogError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// `$XDG_CONFIG_HOME/brickgraph/config.toml`
pub fn global_config_path() -> Result<PathBuf, CatalogError> {
    Ok(config_home()?.join(APP_DIR).join("config.toml"))
}
