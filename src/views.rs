//! Query payloads
//!
//! Serde-serializable structures returned by `CatalogApi`. They carry no
//! behavior; presentation layers render them as JSON or tables.

use crate::composition::ClassCounts;
use crate::store::{CategoryRecord, ItemRecord, StoreStats};
use crate::tree::{ElementEntry, SubtreeNode};
use crate::types::PathStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything known about one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: ItemRecord,
    /// Image addresses ordered by color; empty for the root item
    pub images: Vec<String>,
    /// Color to address; only populated for the root item
    pub colors: BTreeMap<String, String>,
    pub consists_of: ClassCounts,
    pub appears_in: ClassCounts,
    pub path: Vec<PathStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySubtreeView {
    pub path: Vec<PathStep>,
    pub tree: Vec<SubtreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryElementsView {
    pub path: Vec<PathStep>,
    pub elements: Vec<ElementEntry>,
}

/// A category with its direct children and every item below it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetailView {
    pub category: CategoryRecord,
    pub path: Vec<PathStep>,
    pub subcategories: Vec<CategoryRecord>,
    pub objects: Vec<ItemRecord>,
}

/// Table counts plus the root's cached size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatus {
    pub root: Option<CategoryRecord>,
    #[serde(flatten)]
    pub stats: StoreStats,
}
