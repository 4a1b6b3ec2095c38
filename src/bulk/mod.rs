//! Bulk Loader
//!
//! The only writer of catalog structure. Every insert is checked against the
//! unique keys of its table and fails with `Conflict` instead of overwriting.
//! A loader run owns its `ColorCache`; nothing is shared between runs.

pub mod manifest;
pub mod seed;

pub use manifest::CatalogManifest;
pub use seed::demo_manifest;

use crate::config::CatalogSettings;
use crate::error::{CatalogError, StorageError};
use crate::store::{
    CatalogStore, CategoryEdge, CategoryItemEdge, CategoryRecord, CompositionEdge, ItemImage,
    ItemRecord,
};
use crate::types::{CategoryId, ItemClass, ItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Colors each part is already known in, loaded from the store on first use
/// and kept current as the run adds composition edges.
#[derive(Debug, Default)]
pub struct ColorCache {
    by_part: HashMap<ItemId, BTreeSet<String>>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colors_of(
        &mut self,
        store: &dyn CatalogStore,
        part: &ItemId,
    ) -> Result<&BTreeSet<String>, StorageError> {
        if !self.by_part.contains_key(part) {
            let colors = store
                .compositions_by_part(part)?
                .into_iter()
                .map(|edge| edge.color)
                .collect();
            self.by_part.insert(part.clone(), colors);
        }
        Ok(&self.by_part[part])
    }

    /// Note a new edge color; parts not yet cached pick it up from the store
    pub fn record(&mut self, part: &ItemId, color: &str) {
        if let Some(colors) = self.by_part.get_mut(part) {
            colors.insert(color.to_string());
        }
    }

    /// Number of parts with cached colors
    pub fn len(&self) -> usize {
        self.by_part.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_part.is_empty()
    }

    /// Distinct colors across every cached part
    pub fn distinct_colors(&self) -> BTreeSet<&str> {
        self.by_part
            .values()
            .flat_map(|colors| colors.iter().map(String::as_str))
            .collect()
    }
}

/// Category to create under an existing parent
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// None assigns the next free id (current maximum + 1)
    pub id: Option<CategoryId>,
    pub name: String,
    pub parent: CategoryId,
}

/// Item to insert, optionally filed under a category
#[derive(Debug, Clone)]
pub struct NewItem {
    pub record: ItemRecord,
    pub category: Option<CategoryId>,
}

impl NewItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, item_class: ItemClass) -> Self {
        Self {
            record: ItemRecord::new(id, name, item_class),
            category: None,
        }
    }

    pub fn in_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }
}

/// Composition edge as supplied by a caller
///
/// Class codes are raw so out-of-range values surface as `InvalidClass`;
/// when absent they default to the endpoints' classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionFact {
    pub set: ItemId,
    pub part: ItemId,
    #[serde(default)]
    pub set_class: Option<i64>,
    #[serde(default)]
    pub part_class: Option<i64>,
    #[serde(default)]
    pub part_count: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CompositionFact {
    pub fn new(set: impl Into<ItemId>, part: impl Into<ItemId>) -> Self {
        Self {
            set: set.into(),
            part: part.into(),
            set_class: None,
            part_class: None,
            part_count: None,
            color: None,
        }
    }

    pub fn count(mut self, part_count: u32) -> Self {
        self.part_count = Some(part_count);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Bulk load report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkLoadReport {
    pub started_at: Option<DateTime<Utc>>,
    pub categories: usize,
    pub category_edges: usize,
    pub items: usize,
    /// Known items whose descriptive fields were refreshed
    pub items_updated: usize,
    pub memberships: usize,
    pub compositions: usize,
    pub images: usize,
    /// Distinct colors seen on cached parts
    pub colors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

pub struct BulkLoader<'a> {
    store: &'a dyn CatalogStore,
    settings: CatalogSettings,
    colors: ColorCache,
    next_category_id: Option<i64>,
    /// Items inserted or refreshed by this run, in load order
    loaded_items: Vec<ItemId>,
    report: BulkLoadReport,
    started: Instant,
}

fn conflict(message: String) -> CatalogError {
    warn!(%message, "Bulk load conflict");
    CatalogError::Conflict(message)
}

impl<'a> BulkLoader<'a> {
    pub fn new(store: &'a dyn CatalogStore, settings: &CatalogSettings) -> Self {
        Self {
            store,
            settings: settings.clone(),
            colors: ColorCache::new(),
            next_category_id: None,
            loaded_items: Vec::new(),
            report: BulkLoadReport {
                started_at: Some(Utc::now()),
                ..BulkLoadReport::default()
            },
            started: Instant::now(),
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    pub fn colors(&self) -> &ColorCache {
        &self.colors
    }

    fn require_category(&self, id: CategoryId) -> Result<CategoryRecord, CatalogError> {
        self.store
            .get_category(id)?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    fn require_item(&self, id: &ItemId) -> Result<ItemRecord, CatalogError> {
        self.store
            .get_item(id)?
            .ok_or_else(|| CatalogError::ItemNotFound(id.clone()))
    }

    fn take_category_id(&mut self) -> Result<CategoryId, CatalogError> {
        let next = match self.next_category_id {
            Some(next) => next,
            None => {
                self.store
                    .list_categories()?
                    .iter()
                    .map(|record| record.id.0)
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        };
        self.next_category_id = Some(next + 1);
        Ok(CategoryId(next))
    }

    fn bump_category_id(&mut self, used: CategoryId) {
        if let Some(next) = self.next_category_id {
            if used.0 >= next {
                self.next_category_id = Some(used.0 + 1);
            }
        }
    }

    /// Create the root category
    pub fn create_root(
        &mut self,
        id: CategoryId,
        name: impl Into<String>,
    ) -> Result<CategoryRecord, CatalogError> {
        if self.store.get_category(id)?.is_some() {
            return Err(conflict(format!("category {} already exists", id)));
        }
        let record = CategoryRecord::new(id, name);
        self.store.put_category(&record)?;
        self.bump_category_id(id);
        self.report.categories += 1;
        info!(category = %id, name = %record.name, "Root category created");
        Ok(record)
    }

    /// Make sure the configured root exists, creating it when missing
    pub fn ensure_root(&mut self) -> Result<CategoryRecord, CatalogError> {
        match self.store.get_category(self.settings.root_id)? {
            Some(record) => Ok(record),
            None => {
                let name = self.settings.root_name.clone();
                self.create_root(self.settings.root_id, name)
            }
        }
    }

    pub fn add_category(&mut self, category: NewCategory) -> Result<CategoryId, CatalogError> {
        self.require_category(category.parent)?;
        let id = match category.id {
            Some(id) => {
                if self.store.get_category(id)?.is_some() {
                    return Err(conflict(format!("category {} already exists", id)));
                }
                self.bump_category_id(id);
                id
            }
            None => self.take_category_id()?,
        };

        self.store
            .put_category(&CategoryRecord::new(id, category.name.clone()))?;
        self.store.insert_category_edge(CategoryEdge {
            high: category.parent,
            low: id,
        })?;
        self.report.categories += 1;
        self.report.category_edges += 1;
        debug!(category = %id, parent = %category.parent, name = %category.name, "Category added");
        Ok(id)
    }

    /// Add an extra parent → child edge between existing categories
    pub fn link_categories(&mut self, high: CategoryId, low: CategoryId) -> Result<(), CatalogError> {
        self.require_category(high)?;
        self.require_category(low)?;
        if high == low || self.reaches(low, high)? {
            return Err(CatalogError::CycleDetected(low));
        }
        if !self.store.insert_category_edge(CategoryEdge { high, low })? {
            return Err(conflict(format!("edge {} -> {} already exists", high, low)));
        }
        self.report.category_edges += 1;
        debug!(high = %high, low = %low, "Categories linked");
        Ok(())
    }

    /// Whether `target` is reachable from `from` through child edges
    fn reaches(&self, from: CategoryId, target: CategoryId) -> Result<bool, CatalogError> {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for edge in self.store.child_edges(current)? {
                if edge.low == target {
                    return Ok(true);
                }
                if seen.insert(edge.low) {
                    queue.push_back(edge.low);
                }
            }
        }
        Ok(false)
    }

    /// Insert or refresh an item and file it when a category is given
    ///
    /// A known item keeps its class; a different class is a `Conflict`.
    pub fn add_item(&mut self, item: NewItem) -> Result<ItemRecord, CatalogError> {
        if let Some(category) = item.category {
            self.require_category(category)?;
        }
        let record = item.record;
        match self.store.get_item(&record.id)? {
            Some(existing) if existing.item_class != record.item_class => {
                return Err(conflict(format!(
                    "item {} is {} and cannot become {}",
                    record.id, existing.item_class, record.item_class
                )));
            }
            Some(_) => self.report.items_updated += 1,
            None => self.report.items += 1,
        }
        self.store.put_item(&record)?;
        self.loaded_items.push(record.id.clone());

        if let Some(category) = item.category {
            self.attach_item(category, &record.id)?;
        }
        Ok(record)
    }

    /// File an existing item under an existing category
    pub fn attach_item(&mut self, category: CategoryId, item: &ItemId) -> Result<(), CatalogError> {
        self.require_category(category)?;
        self.require_item(item)?;
        let edge = CategoryItemEdge {
            high: category,
            item: item.clone(),
        };
        if !self.store.insert_membership(&edge)? {
            return Err(conflict(format!(
                "item {} is already filed under category {}",
                item, category
            )));
        }
        self.report.memberships += 1;
        Ok(())
    }

    fn resolve_color(&self, color: Option<&str>) -> String {
        match color.map(str::trim) {
            Some(color) if !color.is_empty() => color.to_string(),
            _ => self.settings.default_color.clone(),
        }
    }

    pub fn add_composition(&mut self, fact: CompositionFact) -> Result<CompositionEdge, CatalogError> {
        let set = self.require_item(&fact.set)?;
        let part = self.require_item(&fact.part)?;
        let set_class = match fact.set_class {
            Some(code) => ItemClass::from_code(code)?,
            None => set.item_class,
        };
        let part_class = match fact.part_class {
            Some(code) => ItemClass::from_code(code)?,
            None => part.item_class,
        };

        let edge = CompositionEdge {
            set: fact.set,
            part: fact.part,
            set_class,
            part_class,
            part_count: fact.part_count,
            color: self.resolve_color(fact.color.as_deref()),
        };
        if !self.store.insert_composition(&edge)? {
            return Err(conflict(format!(
                "{} already contains {} in {}",
                edge.set, edge.part, edge.color
            )));
        }
        self.colors.record(&edge.part, &edge.color);
        self.report.compositions += 1;
        Ok(edge)
    }

    pub fn add_image(
        &mut self,
        item: &ItemId,
        color: Option<&str>,
        address: impl Into<String>,
    ) -> Result<ItemImage, CatalogError> {
        self.require_item(item)?;
        let image = ItemImage {
            item: item.clone(),
            color: self.resolve_color(color),
            address: address.into(),
        };
        if !self.store.insert_image(&image)? {
            return Err(conflict(format!(
                "item {} already has an image in {}",
                image.item, image.color
            )));
        }
        self.report.images += 1;
        Ok(image)
    }

    /// One image per color the item is known in (the default color when
    /// none), addressed by `template` with `{id}` and `{color}` substituted.
    /// Colors that already have an image are skipped.
    pub fn add_images_for_known_colors(
        &mut self,
        item: &ItemId,
        template: &str,
    ) -> Result<usize, CatalogError> {
        self.require_item(item)?;
        let mut colors: Vec<String> = self
            .colors
            .colors_of(self.store, item)?
            .iter()
            .cloned()
            .collect();
        if colors.is_empty() {
            colors.push(self.settings.default_color.clone());
        }
        let existing: HashSet<String> = self
            .store
            .images_of_item(item)?
            .into_iter()
            .map(|image| image.color)
            .collect();

        let mut added = 0;
        for color in colors.iter().filter(|color| !existing.contains(*color)) {
            let address = template
                .replace("{id}", item.as_str())
                .replace("{color}", &color.replace(' ', "_"));
            self.add_image(item, Some(color.as_str()), address)?;
            added += 1;
        }
        Ok(added)
    }

    /// Items inserted or refreshed so far, in load order
    pub fn loaded_items(&self) -> &[ItemId] {
        &self.loaded_items
    }

    pub fn finish(mut self) -> BulkLoadReport {
        self.report.colors = self.colors.distinct_colors().len();
        self.report.duration_ms = self.started.elapsed().as_millis() as u64;
        info!(
            categories = self.report.categories,
            items = self.report.items,
            memberships = self.report.memberships,
            compositions = self.report.compositions,
            images = self.report.images,
            duration_ms = self.report.duration_ms,
            "Bulk load finished"
        );
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryCatalogStore;

    fn loader(store: &MemoryCatalogStore) -> BulkLoader<'_> {
        let mut loader = BulkLoader::new(store, &CatalogSettings::default());
        loader.ensure_root().unwrap();
        loader
    }

    #[test]
    fn test_auto_category_ids() {
        let store = MemoryCatalogStore::new();
        let mut loader = loader(&store);
        let a = loader
            .add_category(NewCategory {
                id: None,
                name: "Star Wars".to_string(),
                parent: CategoryId(1),
            })
            .unwrap();
        let b = loader
            .add_category(NewCategory {
                id: Some(CategoryId(10)),
                name: "Technic".to_string(),
                parent: CategoryId(1),
            })
            .unwrap();
        let c = loader
            .add_category(NewCategory {
                id: None,
                name: "City".to_string(),
                parent: CategoryId(1),
            })
            .unwrap();
        assert_eq!((a, b, c), (CategoryId(2), CategoryId(10), CategoryId(11)));
        let report = loader.finish();
        assert_eq!(report.categories, 4);
        assert_eq!(report.category_edges, 3);
    }

    #[test]
    fn test_duplicate_keys_conflict() {
        let store = MemoryCatalogStore::new();
        let mut loader = loader(&store);
        assert_eq!(
            loader.create_root(CategoryId(1), "again").unwrap_err().kind(),
            ErrorKind::Conflict
        );

        loader
            .add_item(NewItem::new("X1", "X-Wing", ItemClass::Set).in_category(CategoryId(1)))
            .unwrap();
        loader.add_item(NewItem::new("P1", "Plate", ItemClass::Part)).unwrap();
        assert_eq!(
            loader.attach_item(CategoryId(1), &ItemId::from("X1")).unwrap_err().kind(),
            ErrorKind::Conflict
        );

        loader
            .add_composition(CompositionFact::new("X1", "P1").count(2).color("Grey"))
            .unwrap();
        let err = loader
            .add_composition(CompositionFact::new("X1", "P1").count(7).color("Grey"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        loader.add_image(&ItemId::from("P1"), None, "a.jpg").unwrap();
        assert_eq!(
            loader.add_image(&ItemId::from("P1"), Some("Default"), "b.jpg").unwrap_err().kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_item_refresh_keeps_class() {
        let store = MemoryCatalogStore::new();
        let mut loader = loader(&store);
        loader.add_item(NewItem::new("3001", "Brick", ItemClass::Part)).unwrap();

        let mut refreshed = NewItem::new("3001", "Brick 2 x 4", ItemClass::Part);
        refreshed.record.weight = Some(2.32);
        loader.add_item(refreshed).unwrap();
        let stored = store.get_item(&ItemId::from("3001")).unwrap().unwrap();
        assert_eq!(stored.name, "Brick 2 x 4");
        assert_eq!(stored.weight, Some(2.32));

        let err = loader
            .add_item(NewItem::new("3001", "Brick", ItemClass::Set))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let report = loader.finish();
        assert_eq!(report.items, 1);
        assert_eq!(report.items_updated, 1);
    }

    #[test]
    fn test_composition_defaults_and_class_codes() {
        let store = MemoryCatalogStore::new();
        let mut loader = loader(&store);
        loader.add_item(NewItem::new("S", "Set", ItemClass::Set)).unwrap();
        loader.add_item(NewItem::new("M", "Fig", ItemClass::Minifigure)).unwrap();

        let edge = loader.add_composition(CompositionFact::new("S", "M")).unwrap();
        assert_eq!(edge.color, "Default");
        assert_eq!(edge.set_class, ItemClass::Set);
        assert_eq!(edge.part_class, ItemClass::Minifigure);
        assert_eq!(edge.part_count, None);

        let mut bad = CompositionFact::new("S", "M").color("Red");
        bad.part_class = Some(12);
        assert!(matches!(
            loader.add_composition(bad),
            Err(CatalogError::InvalidClass(12))
        ));

        assert!(loader
            .add_composition(CompositionFact::new("S", "nope"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_link_categories_rejects_cycles() {
        let store = MemoryCatalogStore::new();
        let mut loader = loader(&store);
        let a = loader
            .add_category(NewCategory {
                id: None,
                name: "A".to_string(),
                parent: CategoryId(1),
            })
            .unwrap();
        let b = loader
            .add_category(NewCategory {
                id: None,
                name: "B".to_string(),
                parent: a,
            })
            .unwrap();
        assert!(matches!(
            loader.link_categories(b, CategoryId(1)),
            Err(CatalogError::CycleDetected(_))
        ));
        assert!(matches!(
            loader.link_categories(a, a),
            Err(CatalogError::CycleDetected(_))
        ));
        assert_eq!(
            loader.link_categories(a, b).unwrap_err().kind(),
            ErrorKind::Conflict
        );
        loader.link_categories(CategoryId(1), b).unwrap();
        assert_eq!(store.parent_edges(b).unwrap().len(), 2);
    }

    #[test]
    fn test_color_cache_tracks_run() {
        let store = MemoryCatalogStore::new();
        let mut loader = loader(&store);
        loader.add_item(NewItem::new("S", "Set", ItemClass::Set)).unwrap();
        loader.add_item(NewItem::new("P", "Part", ItemClass::Part)).unwrap();
        loader
            .add_composition(CompositionFact::new("S", "P").color("Red"))
            .unwrap();

        let added = loader
            .add_images_for_known_colors(&ItemId::from("P"), "/img/{id}_{color}.jpg")
            .unwrap();
        assert_eq!(added, 1);

        loader
            .add_composition(CompositionFact::new("S", "P").color("Dark Blue"))
            .unwrap();
        let added = loader
            .add_images_for_known_colors(&ItemId::from("P"), "/img/{id}_{color}.jpg")
            .unwrap();
        assert_eq!(added, 1);

        let addresses: Vec<String> = store
            .images_of_item(&ItemId::from("P"))
            .unwrap()
            .into_iter()
            .map(|image| image.address)
            .collect();
        assert_eq!(addresses, vec!["/img/P_Dark_Blue.jpg", "/img/P_Red.jpg"]);

        // no known colors: one image in the default color
        assert_eq!(
            loader
                .add_images_for_known_colors(&ItemId::from("S"), "/img/{id}_{color}.jpg")
                .unwrap(),
            1
        );
        assert_eq!(loader.finish().colors, 2);
    }
}
