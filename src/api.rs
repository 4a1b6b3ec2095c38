//! Catalog Query Facade
//!
//! `CatalogApi` is the entry point for callers. It owns the store handle, the
//! catalog settings and the per-category lock manager, and composes the
//! category graph, membership index and composition graph into the payloads in
//! `views`. Every call reads the store afresh.

use crate::aggregation::{self, SizeReport};
use crate::bulk::{demo_manifest, BulkLoadReport, BulkLoader, CatalogManifest};
use crate::composition::{ClassCounts, ComposedItem, CompositionGraph};
use crate::concurrency::CategoryLockManager;
use crate::config::{CatalogConfig, CatalogSettings, StorageBackend};
use crate::error::CatalogError;
use crate::membership::MembershipIndex;
use crate::store::{CatalogStore, CategoryRecord, ItemRecord, MemoryCatalogStore, SledCatalogStore};
use crate::tree::validate::{validate_catalog, ValidationReport};
use crate::tree::CategoryGraph;
use crate::types::{CategoryId, ItemClass, ItemId, NodeRef, PathStep};
use crate::views::{
    CatalogStatus, CategoryDetailView, CategoryElementsView, CategorySubtreeView, ItemDetail,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

/// Catalog API
pub struct CatalogApi {
    store: Arc<dyn CatalogStore>,
    settings: CatalogSettings,
    lock_manager: Arc<CategoryLockManager>,
}

impl CatalogApi {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        settings: CatalogSettings,
        lock_manager: Arc<CategoryLockManager>,
    ) -> Self {
        Self {
            store,
            settings,
            lock_manager,
        }
    }

    /// Fresh API over an empty in-memory store
    pub fn in_memory(settings: CatalogSettings) -> Self {
        Self::new(
            Arc::new(MemoryCatalogStore::new()),
            settings,
            Arc::new(CategoryLockManager::new()),
        )
    }

    /// Open the store the configuration points at
    pub fn open(config: &CatalogConfig, workspace_root: &Path) -> Result<Self, CatalogError> {
        let store: Arc<dyn CatalogStore> = match config.storage.backend {
            StorageBackend::Sled => {
                let path = config.storage.resolve_path(workspace_root)?;
                debug!(path = %path.display(), "Opening sled catalog store");
                Arc::new(SledCatalogStore::open(&path)?)
            }
            StorageBackend::Memory => Arc::new(MemoryCatalogStore::new()),
        };
        Ok(Self::new(
            store,
            config.catalog.clone(),
            Arc::new(CategoryLockManager::new()),
        ))
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    pub fn lock_manager(&self) -> &Arc<CategoryLockManager> {
        &self.lock_manager
    }

    fn graph(&self) -> CategoryGraph<'_> {
        CategoryGraph::new(self.store.as_ref(), self.settings.root_id)
    }

    fn compositions(&self) -> CompositionGraph<'_> {
        CompositionGraph::new(self.store.as_ref())
    }

    /// Run `read` under the read side of every lock on `path`, root first
    fn with_path_read<T>(
        &self,
        path: &[PathStep],
        read: impl FnOnce() -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let ids: Vec<CategoryId> = path
            .iter()
            .filter_map(|step| match step.node {
                NodeRef::Category(id) => Some(id),
                NodeRef::Item(_) => None,
            })
            .collect();
        let locks = self.lock_manager.path_locks(&ids);
        let _guards: Vec<_> = locks.iter().map(|lock| lock.read()).collect();
        read()
    }

    /// Item record with images, composition counts and its root path
    pub fn item_detail(&self, id: &ItemId) -> Result<ItemDetail, CatalogError> {
        let item = self
            .store
            .get_item(id)?
            .ok_or_else(|| CatalogError::ItemNotFound(id.clone()))?;
        let images = self.store.images_of_item(id)?;

        let (images, colors) = if *id == self.settings.root_item() {
            let colors: BTreeMap<String, String> = images
                .into_iter()
                .map(|image| (image.color, image.address))
                .collect();
            (Vec::new(), colors)
        } else {
            let addresses = images.into_iter().map(|image| image.address).collect();
            (addresses, BTreeMap::new())
        };

        // parts and minifigures usually live only in compositions
        let path = match self.graph().item_path(id) {
            Err(CatalogError::UnfiledItem(_)) => {
                vec![PathStep::item(item.id.clone(), item.name.clone())]
            }
            other => other?,
        };

        let compositions = self.compositions();
        Ok(ItemDetail {
            consists_of: compositions.consists_of(id)?,
            appears_in: compositions.appears_in(id)?,
            path,
            item,
            images,
            colors,
        })
    }

    /// Root path of a category and the nested listing below it
    pub fn category_subtree(&self, id: CategoryId) -> Result<CategorySubtreeView, CatalogError> {
        let graph = self.graph();
        let path = graph.path_to_root(id)?;
        let tree = self.with_path_read(&path, || graph.subtree_tree(id))?;
        Ok(CategorySubtreeView { path, tree })
    }

    /// Root path of a category and every item filed below it
    pub fn category_elements(&self, id: CategoryId) -> Result<CategoryElementsView, CatalogError> {
        let graph = self.graph();
        Ok(CategoryElementsView {
            path: graph.path_to_root(id)?,
            elements: graph.flatten_elements(id)?,
        })
    }

    pub fn category_detail(&self, id: CategoryId) -> Result<CategoryDetailView, CatalogError> {
        let graph = self.graph();
        let path = graph.path_to_root(id)?;
        let (category, subcategories) =
            self.with_path_read(&path, || Ok((graph.category(id)?, graph.subcategories(id)?)))?;
        Ok(CategoryDetailView {
            category,
            path,
            subcategories,
            objects: graph.all_objects(id)?,
        })
    }

    pub fn root_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError> {
        self.graph().root_categories()
    }

    pub fn path_to_root(&self, id: CategoryId) -> Result<Vec<PathStep>, CatalogError> {
        self.graph().path_to_root(id)
    }

    pub fn item_path(&self, id: &ItemId) -> Result<Vec<PathStep>, CatalogError> {
        self.graph().item_path(id)
    }

    pub fn all_subcategories(&self, id: CategoryId) -> Result<BTreeSet<CategoryId>, CatalogError> {
        self.graph().all_subcategories(id)
    }

    pub fn all_objects(&self, id: CategoryId) -> Result<Vec<ItemRecord>, CatalogError> {
        self.graph().all_objects(id)
    }

    pub fn direct_items(&self, id: CategoryId) -> Result<Vec<ItemRecord>, CatalogError> {
        MembershipIndex::new(self.store.as_ref()).direct_items(id)
    }

    /// Items whose name contains `query`, ignoring case and Unicode
    /// compatibility forms; ordered by id
    pub fn search_items(&self, query: &str) -> Result<Vec<ItemRecord>, CatalogError> {
        let needle = normalize(query.trim());
        if needle.is_empty() {
            return Err(CatalogError::InvalidInput(
                "search query must not be empty".to_string(),
            ));
        }
        Ok(self
            .store
            .list_items()?
            .into_iter()
            .filter(|item| normalize(&item.name).contains(&needle))
            .collect())
    }

    pub fn consists_of(&self, id: &ItemId) -> Result<ClassCounts, CatalogError> {
        self.compositions().consists_of(id)
    }

    pub fn appears_in(&self, id: &ItemId) -> Result<ClassCounts, CatalogError> {
        self.compositions().appears_in(id)
    }

    pub fn consists_of_detailed(
        &self,
        id: &ItemId,
        part_class: ItemClass,
    ) -> Result<Vec<ComposedItem>, CatalogError> {
        self.compositions().consists_of_detailed(id, part_class)
    }

    pub fn appears_in_detailed(
        &self,
        id: &ItemId,
        set_class: ItemClass,
    ) -> Result<Vec<ComposedItem>, CatalogError> {
        self.compositions().appears_in_detailed(id, set_class)
    }

    pub fn known_colors(&self, id: &ItemId) -> Result<BTreeSet<String>, CatalogError> {
        self.compositions().known_colors(id)
    }

    /// Delete one composition edge; cached sizes are unaffected
    pub fn remove_composition(
        &self,
        set: &ItemId,
        part: &ItemId,
        color: &str,
    ) -> Result<(), CatalogError> {
        if !self.store.remove_composition(set, part, color)? {
            return Err(CatalogError::CompositionNotFound {
                set: set.clone(),
                part: part.clone(),
                color: color.to_string(),
            });
        }
        self.store.flush()?;
        info!(set = %set, part = %part, color, "Composition removed");
        Ok(())
    }

    /// Recompute cached sizes below `root` while holding its write lock
    pub fn recompute_sizes(&self, root: CategoryId) -> Result<SizeReport, CatalogError> {
        self.graph().category(root)?;
        let lock = self.lock_manager.get_lock(root);
        let _guard = lock.write();
        let report = aggregation::recompute_sizes(self.store.as_ref(), root)?;
        self.store.flush()?;
        Ok(report)
    }

    pub fn validate(&self) -> Result<ValidationReport, CatalogError> {
        validate_catalog(self.store.as_ref(), self.settings.root_id)
    }

    pub fn stats(&self) -> Result<CatalogStatus, CatalogError> {
        Ok(CatalogStatus {
            root: self.store.get_category(self.settings.root_id)?,
            stats: self.store.stats()?,
        })
    }

    /// Loader writing to this API's store; call `flush` once it finishes
    pub fn bulk_loader(&self) -> BulkLoader<'_> {
        BulkLoader::new(self.store.as_ref(), &self.settings)
    }

    pub fn load_manifest(&self, manifest: &CatalogManifest) -> Result<BulkLoadReport, CatalogError> {
        let mut loader = self.bulk_loader();
        loader.load_manifest(manifest)?;
        let report = loader.finish();
        self.store.flush()?;
        Ok(report)
    }

    /// Load the built-in demo catalog into an empty store
    pub fn seed_demo(&self) -> Result<BulkLoadReport, CatalogError> {
        let stats = self.store.stats()?;
        if stats.items > 0 {
            return Err(CatalogError::Conflict(format!(
                "catalog already holds {} items; seed needs an empty store",
                stats.items
            )));
        }
        self.load_manifest(&demo_manifest())
    }

    pub fn flush(&self) -> Result<(), CatalogError> {
        self.store.flush()?;
        Ok(())
    }
}

fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}
