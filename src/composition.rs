//! Composition Graph
//!
//! Set → part edges read from either side. Class-partitioned counts count
//! edge rows; `part_count` is carried on detailed listings but never summed.

use crate::error::CatalogError;
use crate::store::{CatalogStore, CompositionEdge, ItemRecord};
use crate::types::{ItemClass, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Index;

/// Row counts per item class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    #[serde(rename = "Sets")]
    pub sets: u64,
    #[serde(rename = "Parts")]
    pub parts: u64,
    #[serde(rename = "MF")]
    pub minifigures: u64,
    #[serde(rename = "Books")]
    pub books: u64,
    #[serde(rename = "Gear")]
    pub gear: u64,
    #[serde(rename = "Catalogs")]
    pub catalogs: u64,
    #[serde(rename = "Instructions")]
    pub instructions: u64,
    #[serde(rename = "Boxes")]
    pub boxes: u64,
}

impl ClassCounts {
    fn slot_mut(&mut self, class: ItemClass) -> &mut u64 {
        match class {
            ItemClass::Set => &mut self.sets,
            ItemClass::Part => &mut self.parts,
            ItemClass::Minifigure => &mut self.minifigures,
            ItemClass::Book => &mut self.books,
            ItemClass::Gear => &mut self.gear,
            ItemClass::Catalog => &mut self.catalogs,
            ItemClass::Instructions => &mut self.instructions,
            ItemClass::Box => &mut self.boxes,
        }
    }

    pub fn increment(&mut self, class: ItemClass) {
        *self.slot_mut(class) += 1;
    }

    pub fn total(&self) -> u64 {
        ItemClass::ALL.iter().map(|class| self[*class]).sum()
    }

    /// (class, count) for every class with a non-zero count
    pub fn non_zero(&self) -> impl Iterator<Item = (ItemClass, u64)> + '_ {
        ItemClass::ALL
            .into_iter()
            .map(move |class| (class, self[class]))
            .filter(|(_, count)| *count > 0)
    }
}

impl Index<ItemClass> for ClassCounts {
    type Output = u64;

    fn index(&self, class: ItemClass) -> &u64 {
        match class {
            ItemClass::Set => &self.sets,
            ItemClass::Part => &self.parts,
            ItemClass::Minifigure => &self.minifigures,
            ItemClass::Book => &self.books,
            ItemClass::Gear => &self.gear,
            ItemClass::Catalog => &self.catalogs,
            ItemClass::Instructions => &self.instructions,
            ItemClass::Box => &self.boxes,
        }
    }
}

/// Item on the far side of a composition edge, with that edge's annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedItem {
    #[serde(flatten)]
    pub item: ItemRecord,
    pub part_count: Option<u32>,
    pub color: String,
}

pub struct CompositionGraph<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> CompositionGraph<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    fn item(&self, id: &ItemId) -> Result<ItemRecord, CatalogError> {
        self.store
            .get_item(id)?
            .ok_or_else(|| CatalogError::ItemNotFound(id.clone()))
    }

    /// Composition rows with `set = id`, partitioned by part class
    pub fn consists_of(&self, id: &ItemId) -> Result<ClassCounts, CatalogError> {
        self.item(id)?;
        let mut counts = ClassCounts::default();
        for edge in self.store.compositions_by_set(id)? {
            counts.increment(edge.part_class);
        }
        Ok(counts)
    }

    /// Composition rows with `part = id`, partitioned by set class
    pub fn appears_in(&self, id: &ItemId) -> Result<ClassCounts, CatalogError> {
        self.item(id)?;
        let mut counts = ClassCounts::default();
        for edge in self.store.compositions_by_part(id)? {
            counts.increment(edge.set_class);
        }
        Ok(counts)
    }

    /// Parts of class `part_class` in `id`, ordered by (part id, color)
    pub fn consists_of_detailed(
        &self,
        id: &ItemId,
        part_class: ItemClass,
    ) -> Result<Vec<ComposedItem>, CatalogError> {
        self.item(id)?;
        self.store
            .compositions_by_set(id)?
            .into_iter()
            .filter(|edge| edge.part_class == part_class)
            .map(|edge| self.annotate(edge.part.clone(), edge))
            .collect()
    }

    /// Sets of class `set_class` containing `id`, ordered by (set id, color)
    pub fn appears_in_detailed(
        &self,
        id: &ItemId,
        set_class: ItemClass,
    ) -> Result<Vec<ComposedItem>, CatalogError> {
        self.item(id)?;
        self.store
            .compositions_by_part(id)?
            .into_iter()
            .filter(|edge| edge.set_class == set_class)
            .map(|edge| self.annotate(edge.set.clone(), edge))
            .collect()
    }

    /// Distinct colors `id` is used in as a part
    pub fn known_colors(&self, id: &ItemId) -> Result<BTreeSet<String>, CatalogError> {
        self.item(id)?;
        Ok(self
            .store
            .compositions_by_part(id)?
            .into_iter()
            .map(|edge| edge.color)
            .collect())
    }

    fn annotate(&self, other: ItemId, edge: CompositionEdge) -> Result<ComposedItem, CatalogError> {
        Ok(ComposedItem {
            item: self.item(&other)?,
            part_count: edge.part_count,
            color: edge.color,
        })
    }
}
