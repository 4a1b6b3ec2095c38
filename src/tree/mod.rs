//! Category Graph
//!
//! Read-only queries over the category edge table: paths to the root, nested
//! subtrees, flattened element listings and descendant sets. Every call reads
//! the store afresh.

pub mod node;
pub mod validate;
pub mod walker;

pub use node::SubtreeNode;
pub use walker::{walk_subtree, SubtreeWalk};

use crate::error::CatalogError;
use crate::store::{CatalogStore, CategoryEdge, CategoryRecord, ItemRecord};
use crate::types::{CategoryId, ItemId, PathStep};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Item found while flattening a subtree, with its own root path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementEntry {
    pub item_id: ItemId,
    pub item_name: String,
    pub path: Vec<PathStep>,
}

/// Queries over the category hierarchy
pub struct CategoryGraph<'a> {
    store: &'a dyn CatalogStore,
    root: CategoryId,
}

impl<'a> CategoryGraph<'a> {
    pub fn new(store: &'a dyn CatalogStore, root: CategoryId) -> Self {
        Self { store, root }
    }

    pub fn root(&self) -> CategoryId {
        self.root
    }

    pub fn category(&self, id: CategoryId) -> Result<CategoryRecord, CatalogError> {
        self.store
            .get_category(id)?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    fn item(&self, id: &ItemId) -> Result<ItemRecord, CatalogError> {
        self.store
            .get_item(id)?
            .ok_or_else(|| CatalogError::ItemNotFound(id.clone()))
    }

    /// Root-first chain of categories ending at `id`
    ///
    /// Follows parent edges upward. With several parents the lowest parent id is
    /// taken.
    pub fn path_to_root(&self, id: CategoryId) -> Result<Vec<PathStep>, CatalogError> {
        let mut current = self.category(id)?;
        let mut seen = HashSet::from([current.id]);
        let mut steps = Vec::new();

        while current.id != self.root {
            let parent = self
                .store
                .parent_edges(current.id)?
                .first()
                .map(|edge| edge.high)
                .ok_or(CatalogError::OrphanCategory(current.id))?;
            if !seen.insert(parent) {
                return Err(CatalogError::CycleDetected(parent));
            }
            let next = self.category(parent)?;
            steps.push(PathStep::category(current.id, current.name));
            current = next;
        }
        steps.push(PathStep::category(current.id, current.name));

        steps.reverse();
        Ok(steps)
    }

    /// Category the item is filed under (lowest id when filed several times)
    pub fn home_category(&self, id: &ItemId) -> Result<CategoryId, CatalogError> {
        self.store
            .memberships_of_item(id)?
            .first()
            .map(|edge| edge.high)
            .ok_or_else(|| CatalogError::UnfiledItem(id.clone()))
    }

    /// Path of the item's home category followed by the item itself
    pub fn item_path(&self, id: &ItemId) -> Result<Vec<PathStep>, CatalogError> {
        let item = self.item(id)?;
        let mut path = self.path_to_root(self.home_category(id)?)?;
        path.push(PathStep::item(item.id, item.name));
        Ok(path)
    }

    pub fn child_edges(&self, id: CategoryId) -> Result<Vec<CategoryEdge>, CatalogError> {
        self.category(id)?;
        Ok(self.store.child_edges(id)?)
    }

    pub fn parent_edges(&self, id: CategoryId) -> Result<Vec<CategoryEdge>, CatalogError> {
        self.category(id)?;
        Ok(self.store.parent_edges(id)?)
    }

    /// Direct child categories, ordered by id
    pub fn subcategories(&self, id: CategoryId) -> Result<Vec<CategoryRecord>, CatalogError> {
        self.child_edges(id)?
            .into_iter()
            .map(|edge| self.category(edge.low))
            .collect()
    }

    /// Categories without any parent edge
    pub fn root_categories(&self) -> Result<Vec<CategoryRecord>, CatalogError> {
        let mut roots = Vec::new();
        for record in self.store.list_categories()? {
            if self.store.parent_edges(record.id)?.is_empty() {
                roots.push(record);
            }
        }
        Ok(roots)
    }

    /// Nested listing of everything below `id`, one entry per direct child
    pub fn subtree_tree(&self, id: CategoryId) -> Result<Vec<SubtreeNode>, CatalogError> {
        let walk = walk_subtree(self.store, id)?;
        let mut built: HashMap<CategoryId, SubtreeNode> = HashMap::new();

        for &category in &walk.post_order {
            let record = walk.record(category)?;
            let children = walk.children_of(category);
            let node = if children.is_empty() {
                SubtreeNode::Leaf {
                    id: record.id,
                    name: record.name.clone(),
                    size: record.size,
                }
            } else {
                SubtreeNode::Branch {
                    id: record.id,
                    name: record.name.clone(),
                    size: record.size,
                    children: children
                        .iter()
                        .map(|child| built.get(child).cloned())
                        .collect::<Option<Vec<_>>>()
                        .ok_or(CatalogError::CategoryNotFound(category))?,
                }
            };
            built.insert(category, node);
        }

        Ok(match built.remove(&id) {
            Some(SubtreeNode::Branch { children, .. }) => children,
            _ => Vec::new(),
        })
    }

    /// Items of every category reached breadth-first from `id`, in visit order
    ///
    /// An item filed under two visited categories is listed twice, as is an
    /// item under a category shared by two visited parents.
    pub fn flatten_elements(&self, id: CategoryId) -> Result<Vec<ElementEntry>, CatalogError> {
        self.category(id)?;
        let mut elements = Vec::new();
        let mut path_cache: HashMap<CategoryId, Vec<PathStep>> = HashMap::new();

        for category in self.breadth_first(id)? {
            for membership in self.store.memberships_of_category(category)? {
                let item = self.item(&membership.item)?;
                let home = self.home_category(&item.id)?;
                let mut path = match path_cache.get(&home) {
                    Some(path) => path.clone(),
                    None => {
                        let path = self.path_to_root(home)?;
                        path_cache.insert(home, path.clone());
                        path
                    }
                };
                path.push(PathStep::item(item.id.clone(), item.name.clone()));
                elements.push(ElementEntry {
                    item_id: item.id,
                    item_name: item.name,
                    path,
                });
            }
        }

        Ok(elements)
    }

    /// Every descendant of `id`, never `id` itself
    pub fn all_subcategories(&self, id: CategoryId) -> Result<BTreeSet<CategoryId>, CatalogError> {
        self.category(id)?;
        let mut descendants: BTreeSet<CategoryId> = self.breadth_first(id)?.into_iter().collect();
        descendants.remove(&id);
        Ok(descendants)
    }

    /// Distinct items filed anywhere in the subtree, ordered by name then id
    pub fn all_objects(&self, id: CategoryId) -> Result<Vec<ItemRecord>, CatalogError> {
        self.category(id)?;
        let mut ids: BTreeSet<ItemId> = BTreeSet::new();
        for category in self.breadth_first(id)? {
            for membership in self.store.memberships_of_category(category)? {
                ids.insert(membership.item);
            }
        }
        let mut items = ids
            .iter()
            .map(|item| self.item(item))
            .collect::<Result<Vec<_>, _>>()?;
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    /// Categories reachable from `start` (inclusive) in breadth-first order
    ///
    /// A category below two parents is listed once per parent, matching how
    /// subtree sizes count it. Fails with `CycleDetected` like the other
    /// subtree walks.
    fn breadth_first(&self, start: CategoryId) -> Result<Vec<CategoryId>, CatalogError> {
        let walk = walk_subtree(self.store, start)?;
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            order.push(current);
            queue.extend(walk.children_of(current).iter().copied());
        }
        Ok(order)
    }
}
