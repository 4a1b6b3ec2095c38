//! Category-Item Membership Index
//!
//! Many-to-many filing of items under categories, queried from either side.

use crate::error::CatalogError;
use crate::store::{CatalogStore, CategoryRecord, ItemRecord};
use crate::tree::CategoryGraph;
use crate::types::{CategoryId, ItemId};
use std::collections::BTreeSet;

pub struct MembershipIndex<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> MembershipIndex<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    fn require_category(&self, id: CategoryId) -> Result<(), CatalogError> {
        match self.store.get_category(id)? {
            Some(_) => Ok(()),
            None => Err(CatalogError::CategoryNotFound(id)),
        }
    }

    /// Items filed directly under `id`, ordered by item id
    pub fn direct_items(&self, id: CategoryId) -> Result<Vec<ItemRecord>, CatalogError> {
        self.require_category(id)?;
        self.store
            .memberships_of_category(id)?
            .into_iter()
            .map(|edge| {
                self.store
                    .get_item(&edge.item)?
                    .ok_or(CatalogError::ItemNotFound(edge.item))
            })
            .collect()
    }

    pub fn direct_item_count(&self, id: CategoryId) -> Result<usize, CatalogError> {
        self.require_category(id)?;
        Ok(self.store.memberships_of_category(id)?.len())
    }

    /// Categories the item is filed under, ordered by id
    pub fn categories_of(&self, item: &ItemId) -> Result<Vec<CategoryRecord>, CatalogError> {
        if self.store.get_item(item)?.is_none() {
            return Err(CatalogError::ItemNotFound(item.clone()));
        }
        self.store
            .memberships_of_item(item)?
            .into_iter()
            .map(|edge| {
                self.store
                    .get_category(edge.high)?
                    .ok_or(CatalogError::CategoryNotFound(edge.high))
            })
            .collect()
    }

    /// Distinct ids of items filed under `id` or any of its descendants
    pub fn items_under(
        &self,
        graph: &CategoryGraph<'_>,
        id: CategoryId,
    ) -> Result<BTreeSet<ItemId>, CatalogError> {
        let mut categories = graph.all_subcategories(id)?;
        categories.insert(id);
        let mut items = BTreeSet::new();
        for category in categories {
            for edge in self.store.memberships_of_category(category)? {
                items.insert(edge.item);
            }
        }
        Ok(items)
    }
}
