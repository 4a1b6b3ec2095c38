//! In-memory catalog store
//!
//! Ordered maps behind a single `parking_lot::RwLock`. Each edge table keeps a
//! forward and a reverse index so both directions are range scans.

use super::{
    CatalogStore, CategoryEdge, CategoryItemEdge, CategoryRecord, CompositionEdge, ItemImage,
    ItemRecord, StoreStats,
};
use crate::error::StorageError;
use crate::types::{CategoryId, ItemId};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

type CompositionKey = (ItemId, ItemId, String);

#[derive(Default)]
struct Tables {
    categories: BTreeMap<CategoryId, CategoryRecord>,
    items: BTreeMap<ItemId, ItemRecord>,
    /// (high, low)
    edges_down: BTreeSet<(CategoryId, CategoryId)>,
    /// (low, high)
    edges_up: BTreeSet<(CategoryId, CategoryId)>,
    /// (high, item)
    members_by_category: BTreeSet<(CategoryId, ItemId)>,
    /// (item, high)
    members_by_item: BTreeSet<(ItemId, CategoryId)>,
    /// (set, part, color) -> edge
    compositions: BTreeMap<CompositionKey, CompositionEdge>,
    /// (part, set, color)
    compositions_by_part: BTreeSet<CompositionKey>,
    /// (item, color) -> address
    images: BTreeMap<(ItemId, String), String>,
}

impl Tables {
    fn remove_composition(&mut self, set: &ItemId, part: &ItemId, color: &str) -> bool {
        let key = (set.clone(), part.clone(), color.to_string());
        if self.compositions.remove(&key).is_some() {
            self.compositions_by_part
                .remove(&(part.clone(), set.clone(), color.to_string()));
            true
        } else {
            false
        }
    }
}

/// Catalog store held entirely in memory
#[derive(Default)]
pub struct MemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn get_category(&self, id: CategoryId) -> Result<Option<CategoryRecord>, StorageError> {
        Ok(self.tables.read().categories.get(&id).cloned())
    }

    fn put_category(&self, record: &CategoryRecord) -> Result<(), StorageError> {
        self.tables
            .write()
            .categories
            .insert(record.id, record.clone());
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<CategoryRecord>, StorageError> {
        Ok(self.tables.read().categories.values().cloned().collect())
    }

    fn delete_category(&self, id: CategoryId) -> Result<bool, StorageError> {
        let mut tables = self.tables.write();
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }
        let down: Vec<_> = tables
            .edges_down
            .iter()
            .filter(|(high, low)| *high == id || *low == id)
            .copied()
            .collect();
        for (high, low) in down {
            tables.edges_down.remove(&(high, low));
            tables.edges_up.remove(&(low, high));
        }
        let members: Vec<_> = tables
            .members_by_category
            .iter()
            .filter(|(high, _)| *high == id)
            .cloned()
            .collect();
        for (high, item) in members {
            tables.members_by_item.remove(&(item.clone(), high));
            tables.members_by_category.remove(&(high, item));
        }
        Ok(true)
    }

    fn get_item(&self, id: &ItemId) -> Result<Option<ItemRecord>, StorageError> {
        Ok(self.tables.read().items.get(id).cloned())
    }

    fn put_item(&self, record: &ItemRecord) -> Result<(), StorageError> {
        self.tables
            .write()
            .items
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn list_items(&self) -> Result<Vec<ItemRecord>, StorageError> {
        Ok(self.tables.read().items.values().cloned().collect())
    }

    fn delete_item(&self, id: &ItemId) -> Result<bool, StorageError> {
        let mut tables = self.tables.write();
        if tables.items.remove(id).is_none() {
            return Ok(false);
        }
        let homes: Vec<CategoryId> = tables
            .members_by_item
            .iter()
            .filter(|(item, _)| item == id)
            .map(|(_, high)| *high)
            .collect();
        for high in homes {
            tables.members_by_item.remove(&(id.clone(), high));
            tables.members_by_category.remove(&(high, id.clone()));
        }
        let incident: Vec<CompositionKey> = tables
            .compositions
            .keys()
            .filter(|(set, part, _)| set == id || part == id)
            .cloned()
            .collect();
        for (set, part, color) in incident {
            tables.remove_composition(&set, &part, &color);
        }
        tables.images.retain(|(item, _), _| item != id);
        Ok(true)
    }

    fn insert_category_edge(&self, edge: CategoryEdge) -> Result<bool, StorageError> {
        let mut tables = self.tables.write();
        if !tables.edges_down.insert((edge.high, edge.low)) {
            return Ok(false);
        }
        tables.edges_up.insert((edge.low, edge.high));
        Ok(true)
    }

    fn remove_category_edge(&self, edge: CategoryEdge) -> Result<bool, StorageError> {
        let mut tables = self.tables.write();
        let removed = tables.edges_down.remove(&(edge.high, edge.low));
        tables.edges_up.remove(&(edge.low, edge.high));
        Ok(removed)
    }

    fn child_edges(&self, id: CategoryId) -> Result<Vec<CategoryEdge>, StorageError> {
        Ok(self
            .tables
            .read()
            .edges_down
            .range((id, CategoryId(i64::MIN))..=(id, CategoryId(i64::MAX)))
            .map(|(high, low)| CategoryEdge {
                high: *high,
                low: *low,
            })
            .collect())
    }

    fn parent_edges(&self, id: CategoryId) -> Result<Vec<CategoryEdge>, StorageError> {
        Ok(self
            .tables
            .read()
            .edges_up
            .range((id, CategoryId(i64::MIN))..=(id, CategoryId(i64::MAX)))
            .map(|(low, high)| CategoryEdge {
                high: *high,
                low: *low,
            })
            .collect())
    }

    fn list_category_edges(&self) -> Result<Vec<CategoryEdge>, StorageError> {
        Ok(self
            .tables
            .read()
            .edges_down
            .iter()
            .map(|(high, low)| CategoryEdge {
                high: *high,
                low: *low,
            })
            .collect())
    }

    fn insert_membership(&self, edge: &CategoryItemEdge) -> Result<bool, StorageError> {
        let mut tables = self.tables.write();
        if !tables
            .members_by_category
            .insert((edge.high, edge.item.clone()))
        {
            return Ok(false);
        }
        tables.members_by_item.insert((edge.item.clone(), edge.high));
        Ok(true)
    }

    fn remove_membership(&self, edge: &CategoryItemEdge) -> Result<bool, StorageError> {
        let mut tables = self.tables.write();
        let removed = tables
            .members_by_category
            .remove(&(edge.high, edge.item.clone()));
        tables.members_by_item.remove(&(edge.item.clone(), edge.high));
        Ok(removed)
    }

    fn memberships_of_category(
        &self,
        id: CategoryId,
    ) -> Result<Vec<CategoryItemEdge>, StorageError> {
        Ok(self
            .tables
            .read()
            .members_by_category
            .range((id, ItemId::new(""))..)
            .take_while(|(high, _)| *high == id)
            .map(|(high, item)| CategoryItemEdge {
                high: *high,
                item: item.clone(),
            })
            .collect())
    }

    fn memberships_of_item(&self, id: &ItemId) -> Result<Vec<CategoryItemEdge>, StorageError> {
        Ok(self
            .tables
            .read()
            .members_by_item
            .range((id.clone(), CategoryId(i64::MIN))..=(id.clone(), CategoryId(i64::MAX)))
            .map(|(item, high)| CategoryItemEdge {
                high: *high,
                item: item.clone(),
            })
            .collect())
    }

    fn insert_composition(&self, edge: &CompositionEdge) -> Result<bool, StorageError> {
        let mut tables = self.tables.write();
        let key = (edge.set.clone(), edge.part.clone(), edge.color.clone());
        if tables.compositions.contains_key(&key) {
            return Ok(false);
        }
        tables.compositions.insert(key, edge.clone());
        tables
            .compositions_by_part
            .insert((edge.part.clone(), edge.set.clone(), edge.color.clone()));
        Ok(true)
    }

    fn remove_composition(
        &self,
        set: &ItemId,
        part: &ItemId,
        color: &str,
    ) -> Result<bool, StorageError> {
        Ok(self.tables.write().remove_composition(set, part, color))
    }

    fn compositions_by_set(&self, id: &ItemId) -> Result<Vec<CompositionEdge>, StorageError> {
        Ok(self
            .tables
            .read()
            .compositions
            .range((id.clone(), ItemId::new(""), String::new())..)
            .take_while(|((set, _, _), _)| set == id)
            .map(|(_, edge)| edge.clone())
            .collect())
    }

    fn compositions_by_part(&self, id: &ItemId) -> Result<Vec<CompositionEdge>, StorageError> {
        let tables = self.tables.read();
        let edges = tables
            .compositions_by_part
            .range((id.clone(), ItemId::new(""), String::new())..)
            .take_while(|(part, _, _)| part == id)
            .filter_map(|(part, set, color)| {
                tables
                    .compositions
                    .get(&(set.clone(), part.clone(), color.clone()))
                    .cloned()
            })
            .collect();
        Ok(edges)
    }

    fn list_compositions(&self) -> Result<Vec<CompositionEdge>, StorageError> {
        Ok(self.tables.read().compositions.values().cloned().collect())
    }

    fn insert_image(&self, image: &ItemImage) -> Result<bool, StorageError> {
        let mut tables = self.tables.write();
        let key = (image.item.clone(), image.color.clone());
        if tables.images.contains_key(&key) {
            return Ok(false);
        }
        tables.images.insert(key, image.address.clone());
        Ok(true)
    }

    fn images_of_item(&self, id: &ItemId) -> Result<Vec<ItemImage>, StorageError> {
        Ok(self
            .tables
            .read()
            .images
            .range((id.clone(), String::new())..)
            .take_while(|((item, _), _)| item == id)
            .map(|((item, color), address)| ItemImage {
                item: item.clone(),
                color: color.clone(),
                address: address.clone(),
            })
            .collect())
    }

    fn stats(&self) -> Result<StoreStats, StorageError> {
        let tables = self.tables.read();
        Ok(StoreStats {
            categories: tables.categories.len(),
            items: tables.items.len(),
            category_edges: tables.edges_down.len(),
            memberships: tables.members_by_category.len(),
            compositions: tables.compositions.len(),
            images: tables.images.len(),
        })
    }
}
