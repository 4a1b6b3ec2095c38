//! Iterative depth-first walk of a category subtree
//!
//! Nodes are marked grey while their descendants are on the work stack and
//! black once finished. Reaching a grey node again means the edge table has a
//! cycle; reaching a black node means a shared descendant (DAG diamond), which
//! is visited once.

use crate::error::CatalogError;
use crate::store::{CatalogStore, CategoryRecord};
use crate::types::CategoryId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Grey,
    Black,
}

/// Result of walking the subtree under one category
#[derive(Debug, Clone)]
pub struct SubtreeWalk {
    pub root: CategoryId,
    pub records: HashMap<CategoryId, CategoryRecord>,
    /// Direct children of every visited category, ordered by id
    pub children: HashMap<CategoryId, Vec<CategoryId>>,
    /// Every visited category, children before parents; `root` is last
    pub post_order: Vec<CategoryId>,
}

impl SubtreeWalk {
    pub fn record(&self, id: CategoryId) -> Result<&CategoryRecord, CatalogError> {
        self.records
            .get(&id)
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    pub fn children_of(&self, id: CategoryId) -> &[CategoryId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of categories reached, including the root
    pub fn len(&self) -> usize {
        self.post_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.post_order.is_empty()
    }
}

/// Walk everything reachable from `root` through child edges
///
/// Fails with `CategoryNotFound` for an unknown root or a dangling edge and with
/// `CycleDetected` when a category is reachable from itself.
pub fn walk_subtree(
    store: &dyn CatalogStore,
    root: CategoryId,
) -> Result<SubtreeWalk, CatalogError> {
    let mut walk = SubtreeWalk {
        root,
        records: HashMap::new(),
        children: HashMap::new(),
        post_order: Vec::new(),
    };
    let mut marks: HashMap<CategoryId, Mark> = HashMap::new();
    // (category, children already pushed)
    let mut stack: Vec<(CategoryId, bool)> = vec![(root, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            marks.insert(id, Mark::Black);
            walk.post_order.push(id);
            continue;
        }
        match marks.get(&id) {
            Some(Mark::Black) => continue,
            Some(Mark::Grey) => return Err(CatalogError::CycleDetected(id)),
            None => {}
        }

        let record = store
            .get_category(id)?
            .ok_or(CatalogError::CategoryNotFound(id))?;
        let children: Vec<CategoryId> = store
            .child_edges(id)?
            .into_iter()
            .map(|edge| edge.low)
            .collect();

        marks.insert(id, Mark::Grey);
        stack.push((id, true));
        for child in children.iter().rev() {
            stack.push((*child, false));
        }
        walk.records.insert(id, record);
        walk.children.insert(id, children);
    }

    Ok(walk)
}
