//! Catalog Store
//!
//! Typed records for category and item nodes plus the three edge tables
//! (category hierarchy, category membership, item composition). The store owns
//! every record; edges reference nodes by id and are removed together with the
//! node they touch.

pub mod memory;
pub mod persistence;

use crate::error::StorageError;
use crate::types::{CategoryId, ItemClass, ItemId};
use serde::{Deserialize, Serialize};

pub use memory::MemoryCatalogStore;
pub use persistence::SledCatalogStore;

/// Theme node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    /// Cached subtree item count, written only by size aggregation
    pub size: Option<u64>,
}

impl CategoryRecord {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            size: None,
        }
    }
}

/// Catalog item node (set, part, minifigure, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub item_class: ItemClass,
    pub year_first_release: Option<i32>,
    pub year_last_release: Option<i32>,
    pub weight: Option<f64>,
    pub item_dim: Option<String>,
    pub pack_dim: Option<String>,
    pub flat_dim: Option<String>,
    pub stud_dim: Option<String>,
    pub instructions: Option<bool>,
}

impl ItemRecord {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, item_class: ItemClass) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_class,
            year_first_release: None,
            year_last_release: None,
            weight: None,
            item_dim: None,
            pack_dim: None,
            flat_dim: None,
            stud_dim: None,
            instructions: None,
        }
    }
}

/// Parent (`high`) to child (`low`) category edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryEdge {
    pub high: CategoryId,
    pub low: CategoryId,
}

/// Item filed under a category
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryItemEdge {
    pub high: CategoryId,
    pub item: ItemId,
}

/// `set` contains `part` in `color`
///
/// `set_class` and `part_class` cache the endpoint classes at creation time so
/// class-partitioned reads never join back to the item table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionEdge {
    pub set: ItemId,
    pub part: ItemId,
    pub set_class: ItemClass,
    pub part_class: ItemClass,
    /// None means presence only
    pub part_count: Option<u32>,
    pub color: String,
}

/// Image address of an item in one color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemImage {
    pub item: ItemId,
    pub color: String,
    pub address: String,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub categories: usize,
    pub items: usize,
    pub category_edges: usize,
    pub memberships: usize,
    pub compositions: usize,
    pub images: usize,
}

/// Catalog store interface
///
/// `insert_*` methods return `Ok(false)` when the unique key already exists and
/// leave the stored row untouched. `remove_*` methods return whether a row was
/// removed. Every listing is ordered by key.
pub trait CatalogStore: Send + Sync {
    fn get_category(&self, id: CategoryId) -> Result<Option<CategoryRecord>, StorageError>;
    fn put_category(&self, record: &CategoryRecord) -> Result<(), StorageError>;
    fn list_categories(&self) -> Result<Vec<CategoryRecord>, StorageError>;
    /// Delete a category and every edge that touches it
    fn delete_category(&self, id: CategoryId) -> Result<bool, StorageError>;

    fn get_item(&self, id: &ItemId) -> Result<Option<ItemRecord>, StorageError>;
    fn put_item(&self, record: &ItemRecord) -> Result<(), StorageError>;
    fn list_items(&self) -> Result<Vec<ItemRecord>, StorageError>;
    /// Delete an item with its memberships, composition edges and images
    fn delete_item(&self, id: &ItemId) -> Result<bool, StorageError>;

    fn insert_category_edge(&self, edge: CategoryEdge) -> Result<bool, StorageError>;
    fn remove_category_edge(&self, edge: CategoryEdge) -> Result<bool, StorageError>;
    /// Edges with `high = id`, ordered by child id
    fn child_edges(&self, id: CategoryId) -> Result<Vec<CategoryEdge>, StorageError>;
    /// Edges with `low = id`, ordered by parent id
    fn parent_edges(&self, id: CategoryId) -> Result<Vec<CategoryEdge>, StorageError>;
    fn list_category_edges(&self) -> Result<Vec<CategoryEdge>, StorageError>;

    fn insert_membership(&self, edge: &CategoryItemEdge) -> Result<bool, StorageError>;
    fn remove_membership(&self, edge: &CategoryItemEdge) -> Result<bool, StorageError>;
    /// Memberships with `high = id`, ordered by item id
    fn memberships_of_category(&self, id: CategoryId)
        -> Result<Vec<CategoryItemEdge>, StorageError>;
    /// Memberships of one item, ordered by category id
    fn memberships_of_item(&self, id: &ItemId) -> Result<Vec<CategoryItemEdge>, StorageError>;

    fn insert_composition(&self, edge: &CompositionEdge) -> Result<bool, StorageError>;
    fn remove_composition(
        &self,
        set: &ItemId,
        part: &ItemId,
        color: &str,
    ) -> Result<bool, StorageError>;
    /// Edges with `set = id`, ordered by (part, color)
    fn compositions_by_set(&self, id: &ItemId) -> Result<Vec<CompositionEdge>, StorageError>;
    /// Edges with `part = id`, ordered by (set, color)
    fn compositions_by_part(&self, id: &ItemId) -> Result<Vec<CompositionEdge>, StorageError>;
    fn list_compositions(&self) -> Result<Vec<CompositionEdge>, StorageError>;

    fn insert_image(&self, image: &ItemImage) -> Result<bool, StorageError>;
    /// Images of one item, ordered by color
    fn images_of_item(&self, id: &ItemId) -> Result<Vec<ItemImage>, StorageError>;

    fn stats(&self) -> Result<StoreStats, StorageError>;

    /// Make every completed write durable; a no-op for volatile backends
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Overwrite the cached size of an existing category; false if it does not exist
    fn set_category_size(&self, id: CategoryId, size: u64) -> Result<bool, StorageError> {
        match self.get_category(id)? {
            Some(mut record) => {
                record.size = Some(size);
                self.put_category(&record)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
