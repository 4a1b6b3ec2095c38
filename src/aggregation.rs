//! Subtree Size Aggregation
//!
//! Materializes `size` on every category of a subtree:
//! `size(c) = direct items of c + sum of size(child)`. Sizes are not
//! maintained incrementally; any mutation leaves them stale until the next run.

use crate::error::CatalogError;
use crate::store::CatalogStore;
use crate::tree::walk_subtree;
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Aggregation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeReport {
    /// Category the pass started from
    pub root: CategoryId,
    /// Number of categories whose size was written
    pub categories_updated: usize,
    /// Size written on `root`
    pub root_size: u64,
    pub computed_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Subtree sizes of every category under `root`, without writing them
///
/// Children are summed before their parents, so each category is read once.
/// A category shared by two parents contributes to both.
pub fn compute_sizes(
    store: &dyn CatalogStore,
    root: CategoryId,
) -> Result<BTreeMap<CategoryId, u64>, CatalogError> {
    let walk = walk_subtree(store, root)?;
    let mut sizes: BTreeMap<CategoryId, u64> = BTreeMap::new();

    for &id in &walk.post_order {
        let direct = store.memberships_of_category(id)?.len() as u64;
        let below: u64 = walk
            .children_of(id)
            .iter()
            .map(|child| sizes.get(child).copied().unwrap_or(0))
            .sum();
        sizes.insert(id, direct + below);
    }

    Ok(sizes)
}

/// Recompute and store the size of every category under `root`
pub fn recompute_sizes(
    store: &dyn CatalogStore,
    root: CategoryId,
) -> Result<SizeReport, CatalogError> {
    let start_time = std::time::Instant::now();
    let sizes = compute_sizes(store, root)?;

    for (&id, &size) in &sizes {
        store.set_category_size(id, size)?;
        debug!(category = %id, size, "Category size written");
    }

    let report = SizeReport {
        root,
        categories_updated: sizes.len(),
        root_size: sizes.get(&root).copied().unwrap_or(0),
        computed_at: Utc::now(),
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    info!(
        root = %root,
        categories = report.categories_updated,
        size = report.root_size,
        duration_ms = report.duration_ms,
        "Subtree sizes recomputed"
    );
    Ok(report)
}
