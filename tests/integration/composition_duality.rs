use brickgraph::composition::CompositionGraph;
use brickgraph::store::{CatalogStore, CompositionEdge, ItemRecord, MemoryCatalogStore};
use brickgraph::{ItemClass, ItemId};
use proptest::prelude::*;

const COLORS: [&str; 3] = ["Red", "Grey", "Black"];

fn item_id(n: usize) -> ItemId {
    ItemId::new(format!("I{}", n))
}

/// Every item must be findable from both ends of each of its edges
fn assert_dual(store: &MemoryCatalogStore, classes: &[ItemClass]) {
    let graph = CompositionGraph::new(store);
    for (a, class_a) in classes.iter().enumerate() {
        for class in ItemClass::ALL {
            for entry in graph.consists_of_detailed(&item_id(a), class).unwrap() {
                let back = graph
                    .appears_in_detailed(&entry.item.id, *class_a)
                    .unwrap();
                assert!(
                    back.iter()
                        .any(|set| set.item.id == item_id(a) && set.color == entry.color),
                    "{} -> {} missing from appears_in",
                    a,
                    entry.item.id
                );
            }
            for entry in graph.appears_in_detailed(&item_id(a), class).unwrap() {
                let forward = graph
                    .consists_of_detailed(&entry.item.id, *class_a)
                    .unwrap();
                assert!(
                    forward
                        .iter()
                        .any(|part| part.item.id == item_id(a) && part.color == entry.color),
                    "{} <- {} missing from consists_of",
                    a,
                    entry.item.id
                );
            }
        }
    }
}

#[test]
fn rows_are_counted_not_quantities() {
    let store = MemoryCatalogStore::new();
    store
        .put_item(&ItemRecord::new("S", "Set", ItemClass::Set))
        .unwrap();
    store
        .put_item(&ItemRecord::new("P", "Part", ItemClass::Part))
        .unwrap();
    store
        .put_item(&ItemRecord::new("Q", "Other part", ItemClass::Part))
        .unwrap();
    for (part, color, count) in [("P", "Red", Some(2)), ("P", "Blue", None), ("Q", "Red", Some(50))] {
        store
            .insert_composition(&CompositionEdge {
                set: ItemId::from("S"),
                part: ItemId::from(part),
                set_class: ItemClass::Set,
                part_class: ItemClass::Part,
                part_count: count,
                color: color.to_string(),
            })
            .unwrap();
    }
    let graph = CompositionGraph::new(&store);
    assert_eq!(graph.consists_of(&ItemId::from("S")).unwrap().parts, 3);
    assert_eq!(graph.appears_in(&ItemId::from("Q")).unwrap().sets, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn consists_of_and_appears_in_are_dual(
        class_codes in prop::collection::vec(0i64..8, 2..8),
        edges in prop::collection::vec((any::<usize>(), any::<usize>(), 0usize..3), 0..30),
    ) {
        let store = MemoryCatalogStore::new();
        let classes: Vec<ItemClass> = class_codes
            .iter()
            .map(|code| ItemClass::from_code(*code).unwrap())
            .collect();
        for (n, class) in classes.iter().enumerate() {
            store
                .put_item(&ItemRecord::new(item_id(n), format!("Item {}", n), *class))
                .unwrap();
        }
        for (set, part, color) in edges {
            let set = set % classes.len();
            let part = part % classes.len();
            if set == part {
                continue;
            }
            store
                .insert_composition(&CompositionEdge {
                    set: item_id(set),
                    part: item_id(part),
                    set_class: classes[set],
                    part_class: classes[part],
                    part_count: None,
                    color: COLORS[color].to_string(),
                })
                .unwrap();
        }

        assert_dual(&store, &classes);

        let graph = CompositionGraph::new(&store);
        let forward: u64 = (0..classes.len())
            .map(|n| graph.consists_of(&item_id(n)).unwrap().total())
            .sum();
        let backward: u64 = (0..classes.len())
            .map(|n| graph.appears_in(&item_id(n)).unwrap().total())
            .sum();
        prop_assert_eq!(forward, backward);
        prop_assert_eq!(forward as usize, store.stats().unwrap().compositions);
    }
}
