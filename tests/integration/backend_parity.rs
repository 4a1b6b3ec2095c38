use brickgraph::aggregation::recompute_sizes;
use brickgraph::bulk::{demo_manifest, BulkLoader};
use brickgraph::config::CatalogSettings;
use brickgraph::store::{CatalogStore, MemoryCatalogStore, SledCatalogStore};
use brickgraph::tree::CategoryGraph;
use brickgraph::{CategoryId, ItemId};

fn seed(store: &dyn CatalogStore) {
    let mut loader = BulkLoader::new(store, &CatalogSettings::default());
    loader.load_manifest(&demo_manifest()).unwrap();
    loader.finish();
    recompute_sizes(store, CategoryId(1)).unwrap();
}

#[test]
fn memory_and_sled_answer_alike() {
    let memory = MemoryCatalogStore::new();
    let sled = SledCatalogStore::temporary().unwrap();
    seed(&memory);
    seed(&sled);

    assert_eq!(memory.stats().unwrap(), sled.stats().unwrap());
    assert_eq!(memory.list_categories().unwrap(), sled.list_categories().unwrap());
    assert_eq!(memory.list_items().unwrap(), sled.list_items().unwrap());
    assert_eq!(
        memory.list_category_edges().unwrap(),
        sled.list_category_edges().unwrap()
    );
    assert_eq!(
        memory.list_compositions().unwrap(),
        sled.list_compositions().unwrap()
    );

    let memory_graph = CategoryGraph::new(&memory, CategoryId(1));
    let sled_graph = CategoryGraph::new(&sled, CategoryId(1));
    for id in [1, 2, 5, 12, 24] {
        assert_eq!(
            memory_graph.subtree_tree(CategoryId(id)).unwrap(),
            sled_graph.subtree_tree(CategoryId(id)).unwrap()
        );
        assert_eq!(
            memory_graph.flatten_elements(CategoryId(id)).unwrap(),
            sled_graph.flatten_elements(CategoryId(id)).unwrap()
        );
    }
    for item in ["1000", "1005", "8024", "8029"] {
        let id = ItemId::from(item);
        assert_eq!(
            memory.compositions_by_part(&id).unwrap(),
            sled.compositions_by_part(&id).unwrap()
        );
        assert_eq!(memory.images_of_item(&id).unwrap(), sled.images_of_item(&id).unwrap());
    }
}

#[test]
fn negative_category_ids_sort_first_in_sled() {
    use brickgraph::store::CategoryRecord;

    let sled = SledCatalogStore::temporary().unwrap();
    for id in [5, -3, 0, -40, 12] {
        sled.put_category(&CategoryRecord::new(CategoryId(id), format!("C{}", id)))
            .unwrap();
    }
    let ids: Vec<i64> = sled
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|c| c.id.0)
        .collect();
    assert_eq!(ids, vec![-40, -3, 0, 5, 12]);
}
