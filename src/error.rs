//! Error types
//!
//! `StorageError` covers the backing store; `CatalogError` is what every
//! catalog operation returns. Presentation layers translate `CatalogError::kind`
//! into their own responses (404, 409, ...).

use crate::types::{CategoryId, ItemId};
use thiserror::Error;

/// Errors raised by a `CatalogStore` backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt key in tree {tree}: {message}")]
    CorruptKey { tree: &'static str, message: String },
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Coarse classification of a `CatalogError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidClass,
    CycleDetected,
    Invalid,
    Config,
    Storage,
}

/// Errors returned by catalog graph operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// A non-root category with no parent edge was reached while walking to the root
    #[error("Category {0} has no parent edge and is not the root")]
    OrphanCategory(CategoryId),

    /// An item that is filed under no category has no path
    #[error("Item {0} is not filed under any category")]
    UnfiledItem(ItemId),

    #[error("Composition not found: {set} -> {part} ({color})")]
    CompositionNotFound {
        set: ItemId,
        part: ItemId,
        color: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid item class: {0} (must be 0-7)")]
    InvalidClass(i64),

    #[error("Cycle detected in category graph at category {0}")]
    CycleDetected(CategoryId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::CategoryNotFound(_)
            | CatalogError::ItemNotFound(_)
            | CatalogError::OrphanCategory(_)
            | CatalogError::UnfiledItem(_)
            | CatalogError::CompositionNotFound { .. } => ErrorKind::NotFound,
            CatalogError::Conflict(_) => ErrorKind::Conflict,
            CatalogError::InvalidClass(_) => ErrorKind::InvalidClass,
            CatalogError::CycleDetected(_) => ErrorKind::CycleDetected,
            CatalogError::InvalidInput(_) => ErrorKind::Invalid,
            CatalogError::ConfigError(_) => ErrorKind::Config,
            CatalogError::StorageError(_) => ErrorKind::Storage,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::StorageError(StorageError::IoError(err))
    }
}
