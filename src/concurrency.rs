//! Per-category locking
//!
//! Size aggregation writes the cached size of every category in a subtree.
//! It holds the write side of its root category's lock for the whole pass;
//! reads that surface sizes hold the read side of every category on their
//! root path, so they never see a half-written subtree under an aggregating
//! ancestor.

use crate::types::CategoryId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-category lock manager
pub struct CategoryLockManager {
    locks: Arc<RwLock<HashMap<CategoryId, Arc<RwLock<()>>>>>,
}

impl CategoryLockManager {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get or create the lock for a category
    pub fn get_lock(&self, id: CategoryId) -> Arc<RwLock<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(&id) {
                return lock.clone();
            }
        }

        // Double-check under the write lock; another thread may have inserted it
        let mut map = self.locks.write();
        map.entry(id)
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Locks for a root-first path, in the same order
    ///
    /// Acquire read guards in this order; writers only ever hold one lock, so
    /// a fixed acquisition order is enough to rule out deadlock.
    pub fn path_locks(&self, path: &[CategoryId]) -> Vec<Arc<RwLock<()>>> {
        path.iter().map(|id| self.get_lock(*id)).collect()
    }

    /// Number of categories that have had a lock created
    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.read().is_empty()
    }
}

impl Default for CategoryLockManager {
    fn default() -> Self {
        Self::new()
    }
}
