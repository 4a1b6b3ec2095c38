use brickgraph::bulk::{BulkLoader, CompositionFact, NewCategory, NewItem};
use brickgraph::config::CatalogSettings;
use brickgraph::store::{CatalogStore, CategoryItemEdge};
use brickgraph::{CatalogApi, CategoryId, ItemClass, ItemId};

/// BRICK Database (1) > Star Wars (2) > Starfighters (3) holding set X1, which
/// contains part P1 ten times in Grey
pub fn star_wars_api() -> CatalogApi {
    let api = CatalogApi::in_memory(CatalogSettings::default());
    let mut loader = api.bulk_loader();
    loader.ensure_root().unwrap();
    let star_wars = loader
        .add_category(NewCategory {
            id: Some(CategoryId(2)),
            name: "Star Wars".to_string(),
            parent: CategoryId(1),
        })
        .unwrap();
    let starfighters = loader
        .add_category(NewCategory {
            id: Some(CategoryId(3)),
            name: "Starfighters".to_string(),
            parent: star_wars,
        })
        .unwrap();
    loader
        .add_item(NewItem::new("X1", "X-Wing", ItemClass::Set).in_category(starfighters))
        .unwrap();
    loader
        .add_item(NewItem::new("P1", "Plate 1x2", ItemClass::Part))
        .unwrap();
    loader
        .add_composition(
            CompositionFact::new("X1", "P1")
                .count(10)
                .color("Grey"),
        )
        .unwrap();
    loader.finish();
    api
}

/// Complete tree of `depth` levels below the root with `branching` children
/// per category; category `c` holds `c % 3` sets of its own.
/// Returns the number of categories created, root included.
pub fn synthetic_tree(store: &dyn CatalogStore, depth: u32, branching: i64) -> usize {
    let mut loader = BulkLoader::new(store, &CatalogSettings::default());
    loader.ensure_root().unwrap();
    let mut level = vec![CategoryId(1)];
    let mut created = vec![CategoryId(1)];
    for _ in 0..depth {
        let mut next = Vec::new();
        for parent in &level {
            for i in 0..branching {
                let id = loader
                    .add_category(NewCategory {
                        id: None,
                        name: format!("{}.{}", parent, i),
                        parent: *parent,
                    })
                    .unwrap();
                next.push(id);
            }
        }
        created.extend(&next);
        level = next;
    }
    for category in &created {
        for n in 0..(category.0 % 3) {
            let id = format!("S{}-{}", category, n);
            loader
                .add_item(NewItem::new(id.as_str(), id.as_str(), ItemClass::Set).in_category(*category))
                .unwrap();
        }
    }
    loader.finish();
    created.len()
}

/// Assert `size = direct items + sum of child sizes` for every category
pub fn assert_sizes_consistent(store: &dyn CatalogStore) {
    for category in store.list_categories().unwrap() {
        let direct = store.memberships_of_category(category.id).unwrap().len() as u64;
        let below: u64 = store
            .child_edges(category.id)
            .unwrap()
            .iter()
            .map(|edge| store.get_category(edge.low).unwrap().unwrap().size.unwrap())
            .sum();
        assert_eq!(
            category.size,
            Some(direct + below),
            "size of category {}",
            category.id
        );
    }
}

pub fn file(store: &dyn CatalogStore, category: i64, item: &str) {
    store
        .insert_membership(&CategoryItemEdge {
            high: CategoryId(category),
            item: ItemId::from(item),
        })
        .unwrap();
}
