//! Catalog integrity checks
//!
//! Errors make the catalog unusable for some query (a path or subtree walk
//! would fail); warnings flag data that queries tolerate but that is likely
//! wrong.

use crate::aggregation::compute_sizes;
use crate::error::CatalogError;
use crate::store::{CatalogStore, CategoryRecord};
use crate::types::{CategoryId, ItemClass, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub category_count: usize,
    pub item_count: usize,
}

/// Check the whole catalog against `root`
pub fn validate_catalog(
    store: &dyn CatalogStore,
    root: CategoryId,
) -> Result<ValidationReport, CatalogError> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let categories: BTreeMap<CategoryId, CategoryRecord> = store
        .list_categories()?
        .into_iter()
        .map(|record| (record.id, record))
        .collect();
    let items = store.list_items()?;
    let item_ids: HashSet<&ItemId> = items.iter().map(|item| &item.id).collect();
    let edges = store.list_category_edges()?;

    if !categories.contains_key(&root) {
        errors.push(format!("Root category {} does not exist", root));
    }

    let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    let mut parents: BTreeMap<CategoryId, Vec<CategoryId>> = BTreeMap::new();
    for edge in &edges {
        if edge.high == edge.low {
            errors.push(format!("Category {} is its own parent", edge.high));
            continue;
        }
        for end in [edge.high, edge.low] {
            if !categories.contains_key(&end) {
                errors.push(format!(
                    "Edge {} -> {} references missing category {}",
                    edge.high, edge.low, end
                ));
            }
        }
        children.entry(edge.high).or_default().push(edge.low);
        parents.entry(edge.low).or_default().push(edge.high);
    }

    let cyclic = find_cycle_members(&categories, &children);
    if !cyclic.is_empty() {
        let ids: Vec<String> = cyclic.iter().map(|id| id.to_string()).collect();
        errors.push(format!("Category cycle through: {}", ids.join(", ")));
    }

    for (low, highs) in &parents {
        if highs.len() > 1 {
            let ids: Vec<String> = highs.iter().map(|id| id.to_string()).collect();
            warnings.push(format!(
                "Category {} has {} parents ({}); paths use the lowest",
                low,
                highs.len(),
                ids.join(", ")
            ));
        }
    }

    if categories.contains_key(&root) {
        let reachable = reachable_from(root, &children);
        for id in categories.keys().filter(|id| !reachable.contains(id)) {
            warnings.push(format!("Category {} is not reachable from the root", id));
        }
    }

    let mut filed: HashSet<ItemId> = HashSet::new();
    for category in categories.keys() {
        for membership in store.memberships_of_category(*category)? {
            if !item_ids.contains(&membership.item) {
                errors.push(format!(
                    "Category {} lists missing item {}",
                    category, membership.item
                ));
            }
            filed.insert(membership.item);
        }
    }
    for item in &items {
        if !filed.contains(&item.id) && item.item_class == ItemClass::Set {
            warnings.push(format!("Set {} is not filed under any category", item.id));
        }
    }

    let classes: HashMap<&ItemId, _> = items
        .iter()
        .map(|item| (&item.id, item.item_class))
        .collect();
    for edge in store.list_compositions()? {
        match (classes.get(&edge.set), classes.get(&edge.part)) {
            (Some(set_class), Some(part_class)) => {
                if *set_class != edge.set_class || *part_class != edge.part_class {
                    warnings.push(format!(
                        "Composition {} -> {} ({}) caches classes {}/{} but items are {}/{}",
                        edge.set,
                        edge.part,
                        edge.color,
                        edge.set_class,
                        edge.part_class,
                        set_class,
                        part_class
                    ));
                }
            }
            _ => errors.push(format!(
                "Composition {} -> {} ({}) references a missing item",
                edge.set, edge.part, edge.color
            )),
        }
    }

    if errors.is_empty() {
        let expected = compute_sizes(store, root)?;
        let mut uncomputed = 0;
        for (id, size) in &expected {
            match categories.get(id).and_then(|record| record.size) {
                Some(cached) if cached != *size => warnings.push(format!(
                    "Category {} caches size {} but has {} items",
                    id, cached, size
                )),
                Some(_) => {}
                None => uncomputed += 1,
            }
        }
        if uncomputed > 0 {
            warnings.push(format!(
                "{} categories have no cached size; run recompute",
                uncomputed
            ));
        }
    }

    Ok(ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        category_count: categories.len(),
        item_count: items.len(),
    })
}

fn reachable_from(
    start: CategoryId,
    children: &HashMap<CategoryId, Vec<CategoryId>>,
) -> HashSet<CategoryId> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for child in children.get(&current).into_iter().flatten() {
            if seen.insert(*child) {
                queue.push_back(*child);
            }
        }
    }
    seen
}

/// Categories that lie on some cycle: members of a strongly connected component
/// with more than one category
///
/// Two passes of iterative depth-first search: finish order over child edges,
/// then components over parent edges in reverse finish order.
fn find_cycle_members(
    categories: &BTreeMap<CategoryId, CategoryRecord>,
    children: &HashMap<CategoryId, Vec<CategoryId>>,
) -> BTreeSet<CategoryId> {
    let mut nodes: BTreeSet<CategoryId> = categories.keys().copied().collect();
    nodes.extend(children.keys().copied());
    nodes.extend(children.values().flatten().copied());

    let mut parents: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    for (high, lows) in children {
        for low in lows.iter().filter(|low| *low != high) {
            parents.entry(*low).or_default().push(*high);
        }
    }

    let mut finished: Vec<CategoryId> = Vec::with_capacity(nodes.len());
    let mut visited: HashSet<CategoryId> = HashSet::new();
    for &start in &nodes {
        if !visited.insert(start) {
            continue;
        }
        // (category, index of the next child to look at)
        let mut stack = vec![(start, 0usize)];
        while let Some((id, next)) = stack.pop() {
            let kids = children.get(&id).map(Vec::as_slice).unwrap_or(&[]);
            match kids.get(next) {
                Some(&child) => {
                    stack.push((id, next + 1));
                    if child != id && visited.insert(child) {
                        stack.push((child, 0));
                    }
                }
                None => finished.push(id),
            }
        }
    }

    let mut members = BTreeSet::new();
    let mut assigned: HashSet<CategoryId> = HashSet::new();
    for &start in finished.iter().rev() {
        if !assigned.insert(start) {
            continue;
        }
        let mut component = vec![start];
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            for &parent in parents.get(&id).into_iter().flatten() {
                if assigned.insert(parent) {
                    component.push(parent);
                    stack.push(parent);
                }
            }
        }
        if component.len() > 1 {
            members.extend(component);
        }
    }
    members
}
