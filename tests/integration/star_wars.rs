use brickgraph::types::NodeRef;
use brickgraph::{CategoryId, ErrorKind, ItemClass, ItemId};

use crate::integration::support::{file, star_wars_api};

#[test]
fn star_wars_paths_and_objects() {
    let api = star_wars_api();

    let path = api.path_to_root(CategoryId(3)).unwrap();
    let names: Vec<&str> = path.iter().map(|step| step.name.as_str()).collect();
    assert_eq!(names, vec!["BRICK Database", "Star Wars", "Starfighters"]);
    assert_eq!(path[0].node, NodeRef::Category(CategoryId(1)));

    let root_path = api.path_to_root(CategoryId(1)).unwrap();
    assert_eq!(root_path.len(), 1);

    let objects = api.all_objects(CategoryId(2)).unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].id, ItemId::from("X1"));

    let elements = api.category_elements(CategoryId(2)).unwrap();
    assert_eq!(elements.elements.len(), 1);
    assert_eq!(
        elements.elements[0].path.last().unwrap().node,
        NodeRef::Item(ItemId::from("X1"))
    );
}

#[test]
fn star_wars_composition_counts() {
    let api = star_wars_api();

    let consists = api.consists_of(&ItemId::from("X1")).unwrap();
    assert_eq!(consists.parts, 1);
    assert_eq!(consists.total(), 1);

    let appears = api.appears_in(&ItemId::from("P1")).unwrap();
    assert_eq!(appears.sets, 1);
    assert_eq!(appears[ItemClass::Set], 1);

    let parts = api
        .consists_of_detailed(&ItemId::from("X1"), ItemClass::Part)
        .unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].part_count, Some(10));
    assert_eq!(parts[0].color, "Grey");

    let detail = api.item_detail(&ItemId::from("X1")).unwrap();
    assert_eq!(detail.path.len(), 4);
    assert_eq!(detail.consists_of.parts, 1);
}

#[test]
fn removing_the_edge_clears_both_sides() {
    let api = star_wars_api();
    api.remove_composition(&ItemId::from("X1"), &ItemId::from("P1"), "Grey")
        .unwrap();

    assert_eq!(api.consists_of(&ItemId::from("X1")).unwrap().parts, 0);
    assert_eq!(api.appears_in(&ItemId::from("P1")).unwrap().sets, 0);
    assert!(api
        .consists_of_detailed(&ItemId::from("X1"), ItemClass::Part)
        .unwrap()
        .is_empty());
    assert!(api.known_colors(&ItemId::from("P1")).unwrap().is_empty());
}

#[test]
fn sizes_after_recompute() {
    let api = star_wars_api();
    let report = api.recompute_sizes(CategoryId(1)).unwrap();
    assert_eq!(report.root_size, 1);

    for id in 1..=3 {
        let detail = api.category_detail(CategoryId(id)).unwrap();
        assert_eq!(detail.category.size, Some(1), "category {}", id);
    }

    // a second filing inside the subtree adds a membership row but not an object
    file(api.store(), 2, "X1");
    api.recompute_sizes(CategoryId(1)).unwrap();
    assert_eq!(api.category_detail(CategoryId(1)).unwrap().category.size, Some(2));
    assert_eq!(api.all_objects(CategoryId(1)).unwrap().len(), 1);
    assert_eq!(api.category_elements(CategoryId(1)).unwrap().elements.len(), 2);
}

#[test]
fn unknown_ids_are_not_found() {
    let api = star_wars_api();
    for err in [
        api.category_subtree(CategoryId(404)).unwrap_err(),
        api.category_elements(CategoryId(404)).unwrap_err(),
        api.item_detail(&ItemId::from("404")).unwrap_err(),
        api.consists_of(&ItemId::from("404")).unwrap_err(),
        api.appears_in(&ItemId::from("404")).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::NotFound, "{}", err);
    }
}
