use brickgraph::aggregation::recompute_sizes;
use brickgraph::bulk::{BulkLoader, NewCategory, NewItem};
use brickgraph::config::CatalogSettings;
use brickgraph::store::{CatalogStore, MemoryCatalogStore};
use brickgraph::tree::CategoryGraph;
use brickgraph::{CategoryId, ItemClass};
use proptest::prelude::*;

use crate::integration::support::{assert_sizes_consistent, synthetic_tree};

#[test]
fn depth_four_branching_three_tree() {
    let store = MemoryCatalogStore::new();
    let categories = synthetic_tree(&store, 4, 3);
    assert_eq!(categories, 1 + 3 + 9 + 27 + 81);

    let report = recompute_sizes(&store, CategoryId(1)).unwrap();
    assert_eq!(report.categories_updated, categories);
    assert_sizes_consistent(&store);

    let memberships = store.stats().unwrap().memberships as u64;
    assert_eq!(report.root_size, memberships);
}

#[test]
fn paths_have_depth_plus_one_steps() {
    let store = MemoryCatalogStore::new();
    synthetic_tree(&store, 3, 2);
    let graph = CategoryGraph::new(&store, CategoryId(1));

    // breadth-first ids: 1 | 2 3 | 4..7 | 8..15
    for (id, depth) in [(1, 0), (2, 1), (3, 1), (5, 2), (15, 3)] {
        let path = graph.path_to_root(CategoryId(id)).unwrap();
        assert_eq!(path.len(), depth + 1, "category {}", id);
        assert_eq!(path[0].name, "BRICK Database");
    }

    let below = graph.all_subcategories(CategoryId(2)).unwrap();
    assert_eq!(below.len(), 2 + 4);
    assert!(!below.contains(&CategoryId(2)));
    assert_eq!(graph.all_subcategories(CategoryId(2)).unwrap(), below);
}

/// Random forest under the root: entry `i` is category `i + 2`, whose parent
/// is any earlier category, holding up to three sets
fn random_tree() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((any::<usize>(), 0usize..4), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sizes_sum_children_and_direct_items(shape in random_tree()) {
        let store = MemoryCatalogStore::new();
        let mut loader = BulkLoader::new(&store, &CatalogSettings::default());
        loader.ensure_root().unwrap();
        let mut ids = vec![CategoryId(1)];
        let mut total = 0u64;
        for (i, (parent_pick, items)) in shape.iter().enumerate() {
            let parent = ids[parent_pick % ids.len()];
            let id = loader
                .add_category(NewCategory {
                    id: None,
                    name: format!("C{}", i),
                    parent,
                })
                .unwrap();
            for n in 0..*items {
                let item = format!("S{}-{}", id, n);
                loader
                    .add_item(NewItem::new(item.as_str(), item.as_str(), ItemClass::Set).in_category(id))
                    .unwrap();
                total += 1;
            }
            ids.push(id);
        }
        loader.finish();

        let report = recompute_sizes(&store, CategoryId(1)).unwrap();
        prop_assert_eq!(report.categories_updated, ids.len());
        prop_assert_eq!(report.root_size, total);
        assert_sizes_consistent(&store);

        let graph = CategoryGraph::new(&store, CategoryId(1));
        let all = graph.all_subcategories(CategoryId(1)).unwrap();
        prop_assert_eq!(all.len(), ids.len() - 1);
        prop_assert_eq!(graph.all_objects(CategoryId(1)).unwrap().len() as u64, total);
    }
}
