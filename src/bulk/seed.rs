//! Built-in demo dataset
//!
//! Three top-level themes with nested subthemes. Eight leaf themes get five
//! sets each; every set contains three parts, one minifigure and one
//! instruction booklet, all in the default color.

use super::manifest::{CatalogManifest, ManifestCategory, ManifestItem};
use super::CompositionFact;
use crate::types::ItemClass;

/// Image addresses generated for the demo dataset
pub const DEMO_IMAGE_TEMPLATE: &str = "/media/generated_images/{id}_{color}.jpg";

const SETS_PER_THEME: i64 = 5;
const PARTS_PER_SET: i64 = 3;

/// Populated themes and the first item id of each
const POPULATED: [(&str, i64); 8] = [
    ("Ultimate Collector Series", 1000),
    ("Star Wars Starfighters", 2000),
    ("Star Wars Capital Ships", 3000),
    ("Technic Cars", 4000),
    ("Technic Trucks", 5000),
    ("City Police", 6000),
    ("City Fire", 7000),
    ("City Buildings", 8000),
];

fn leaf(name: &str) -> ManifestCategory {
    ManifestCategory::new(name)
}

fn theme_tree() -> Vec<ManifestCategory> {
    vec![
        ManifestCategory::new("Star Wars").with_children(vec![
            leaf("Ultimate Collector Series"),
            ManifestCategory::new("Vehicles").with_children(vec![
                leaf("Star Wars Starfighters"),
                leaf("Star Wars Capital Ships"),
                leaf("Star Wars Ground Vehicles"),
            ]),
            leaf("Star Wars Locations"),
            leaf("Star Wars Minifigures"),
        ]),
        ManifestCategory::new("Technic").with_children(vec![
            ManifestCategory::new("Vehicles").with_children(vec![
                leaf("Technic Cars"),
                leaf("Technic Trucks"),
                leaf("Technic Construction"),
            ]),
            leaf("Technic Machines"),
            leaf("Technic Robotics"),
        ]),
        ManifestCategory::new("City").with_children(vec![
            leaf("City Police"),
            leaf("City Fire"),
            ManifestCategory::new("Transport").with_children(vec![
                leaf("City Cars"),
                leaf("City Trains"),
                leaf("City Aircraft"),
            ]),
            leaf("City Buildings"),
        ]),
    ]
}

fn find_mut<'a>(
    categories: &'a mut [ManifestCategory],
    name: &str,
) -> Option<&'a mut ManifestCategory> {
    let mut stack: Vec<&'a mut ManifestCategory> = categories.iter_mut().collect();
    while let Some(category) = stack.pop() {
        if category.name == name {
            return Some(category);
        }
        stack.extend(category.children.iter_mut());
    }
    None
}

/// Sets, parts, minifigures and booklets for one theme
fn populate(manifest: &mut CatalogManifest, theme: &str, base_id: i64) -> Vec<ManifestItem> {
    let mut sets = Vec::new();
    for i in 0..SETS_PER_THEME {
        let year = 2020 + i as i32;
        let set_name = format!("{} Set {}", theme, i + 1);
        let set_id = (base_id + i).to_string();

        let mut set = ManifestItem::new(set_id.clone(), set_name.clone(), ItemClass::Set);
        set.year_first_release = Some(year);
        set.weight = Some((500 + i * 100) as f64);
        set.pack_dim = Some(format!("{}x{}x{} cm", 30 + i, 20 + i, 10 + i));
        set.stud_dim = Some(format!("{}x{}", 32 + i, 16 + i));
        set.instructions = Some(true);
        sets.push(set);

        for j in 0..PARTS_PER_SET {
            let part_id = (base_id + SETS_PER_THEME + i * PARTS_PER_SET + j).to_string();
            let mut part = ManifestItem::new(
                part_id.clone(),
                format!("Part {} for {}", j + 1, set_name),
                ItemClass::Part,
            );
            part.year_first_release = Some(year);
            manifest.items.push(part);
            manifest
                .compositions
                .push(CompositionFact::new(set_id.clone(), part_id).count(j as u32 + 1));
        }

        let minifig_id = (base_id + SETS_PER_THEME * 4 + i).to_string();
        let mut minifig = ManifestItem::new(
            minifig_id.clone(),
            format!("Minifigure for {}", set_name),
            ItemClass::Minifigure,
        );
        minifig.year_first_release = Some(year);
        manifest.items.push(minifig);
        manifest
            .compositions
            .push(CompositionFact::new(set_id.clone(), minifig_id).count(1));

        let booklet_id = (base_id + SETS_PER_THEME * 5 + i).to_string();
        let mut booklet = ManifestItem::new(
            booklet_id.clone(),
            format!("Instructions for {}", set_name),
            ItemClass::Instructions,
        );
        booklet.year_first_release = Some(year);
        manifest.items.push(booklet);
        manifest
            .compositions
            .push(CompositionFact::new(set_id, booklet_id).count(1));
    }
    sets
}

/// The demo catalog: 24 categories, 240 items, 40 memberships, 200 composition edges
pub fn demo_manifest() -> CatalogManifest {
    let mut manifest = CatalogManifest {
        categories: theme_tree(),
        image_template: Some(DEMO_IMAGE_TEMPLATE.to_string()),
        ..CatalogManifest::default()
    };
    for (theme, base_id) in POPULATED {
        let sets = populate(&mut manifest, theme, base_id);
        if let Some(category) = find_mut(&mut manifest.categories, theme) {
            category.items = sets;
        }
    }
    manifest
}
