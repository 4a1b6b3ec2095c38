//! Text rendering of query payloads and maintenance reports.

use crate::aggregation::SizeReport;
use crate::bulk::BulkLoadReport;
use crate::composition::{ClassCounts, ComposedItem};
use crate::store::{CategoryRecord, ItemRecord};
use crate::tree::validate::ValidationReport;
use crate::tree::SubtreeNode;
use crate::types::{ItemClass, PathStep};
use crate::views::{
    CatalogStatus, CategoryDetailView, CategoryElementsView, CategorySubtreeView, ItemDetail,
};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::collections::BTreeSet;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn size_cell(size: Option<u64>) -> String {
    size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Root-first path joined with ` > `
pub fn format_path(path: &[PathStep]) -> String {
    path.iter()
        .map(|step| step.name.as_str())
        .collect::<Vec<_>>()
        .join(" > ")
}

pub fn format_category_table(categories: &[CategoryRecord]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Size"]);
    for category in categories {
        table.add_row(vec![
            category.id.to_string(),
            category.name.clone(),
            size_cell(category.size),
        ]);
    }
    table.to_string()
}

pub fn format_item_table(items: &[ItemRecord]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Class", "Released"]);
    for item in items {
        table.add_row(vec![
            item.id.to_string(),
            item.name.clone(),
            item.item_class.to_string(),
            optional(&item.year_first_release),
        ]);
    }
    table.to_string()
}

pub fn format_categories_text(title: &str, categories: &[CategoryRecord]) -> String {
    let mut out = format!("{}\n\n", format_section_heading(title));
    if categories.is_empty() {
        out.push_str("No categories.\n");
        return out;
    }
    out.push_str(&format!("{}\n", format_category_table(categories)));
    out
}

pub fn format_items_text(title: &str, items: &[ItemRecord]) -> String {
    let mut out = format!("{}\n\n", format_section_heading(title));
    if items.is_empty() {
        out.push_str("No items.\n");
        return out;
    }
    out.push_str(&format!("{}\n\n", format_item_table(items)));
    out.push_str(&format!("Total: {} items.\n", items.len()));
    out
}

pub fn format_path_text(path: &[PathStep]) -> String {
    format!(
        "{}\n\n  {}\n",
        format_section_heading("Path"),
        format_path(path)
    )
}

/// Indented tree, drawn without recursion
pub fn format_subtree_text(view: &CategorySubtreeView) -> String {
    let mut out = format!(
        "{}\n\n  {}\n",
        format_section_heading("Subtree"),
        format_path(&view.path)
    );
    if view.tree.is_empty() {
        out.push_str("  (no subcategories)\n");
        return out;
    }

    let mut stack: Vec<(&SubtreeNode, String, bool)> = Vec::new();
    let last = view.tree.len() - 1;
    for (i, node) in view.tree.iter().enumerate().rev() {
        stack.push((node, "  ".to_string(), i == last));
    }
    while let Some((node, prefix, is_last)) = stack.pop() {
        let branch = if is_last { "└── " } else { "├── " };
        out.push_str(&format!(
            "{}{}{} ({}) [{}]\n",
            prefix,
            branch,
            node.name(),
            node.id(),
            size_cell(node.size())
        ));
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let children = node.children();
        for (i, child) in children.iter().enumerate().rev() {
            stack.push((child, child_prefix.clone(), i + 1 == children.len()));
        }
    }
    out
}

pub fn format_elements_text(view: &CategoryElementsView) -> String {
    let mut out = format!(
        "{}\n\n  {}\n\n",
        format_section_heading("Elements"),
        format_path(&view.path)
    );
    if view.elements.is_empty() {
        out.push_str("No items.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Path"]);
    for element in &view.elements {
        table.add_row(vec![
            element.item_id.to_string(),
            element.item_name.clone(),
            format_path(&element.path),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Total: {} elements.\n", view.elements.len()));
    out
}

pub fn format_category_detail_text(view: &CategoryDetailView) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Category"));
    out.push_str(&format!("  Id: {}\n", view.category.id));
    out.push_str(&format!("  Name: {}\n", view.category.name));
    out.push_str(&format!("  Size: {}\n", size_cell(view.category.size)));
    out.push_str(&format!("  Path: {}\n\n", format_path(&view.path)));
    out.push_str(&format_categories_text("Subcategories", &view.subcategories));
    out.push('\n');
    out.push_str(&format_items_text("Objects", &view.objects));
    out
}

fn format_counts_table(counts: &ClassCounts) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Class", "Rows"]);
    for (class, count) in counts.non_zero() {
        table.add_row(vec![class.to_string(), count.to_string()]);
    }
    table.to_string()
}

pub fn format_class_counts_text(title: &str, counts: &ClassCounts) -> String {
    let mut out = format!("{}\n\n", format_section_heading(title));
    if counts.total() == 0 {
        out.push_str("None.\n");
    } else {
        out.push_str(&format!("{}\n", format_counts_table(counts)));
    }
    out
}

pub fn format_composed_items_text(title: &str, class: ItemClass, items: &[ComposedItem]) -> String {
    let mut out = format!("{} ({})\n\n", format_section_heading(title), class);
    if items.is_empty() {
        out.push_str("None.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Color", "Count"]);
    for entry in items {
        table.add_row(vec![
            entry.item.id.to_string(),
            entry.item.name.clone(),
            entry.color.clone(),
            optional(&entry.part_count),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_item_detail_text(detail: &ItemDetail) -> String {
    let item = &detail.item;
    let mut out = format!("{}\n\n", format_section_heading("Item"));
    out.push_str(&format!("  Id: {}\n", item.id));
    out.push_str(&format!("  Name: {}\n", item.name));
    out.push_str(&format!("  Class: {}\n", item.item_class));
    out.push_str(&format!("  Path: {}\n", format_path(&detail.path)));
    out.push_str(&format!(
        "  Released: {} - {}\n",
        optional(&item.year_first_release),
        optional(&item.year_last_release)
    ));
    out.push_str(&format!("  Weight: {}\n", optional(&item.weight)));
    for (label, value) in [
        ("Item dimensions", &item.item_dim),
        ("Package dimensions", &item.pack_dim),
        ("Flat dimensions", &item.flat_dim),
        ("Stud dimensions", &item.stud_dim),
    ] {
        if let Some(value) = value {
            out.push_str(&format!("  {}: {}\n", label, value));
        }
    }
    if let Some(instructions) = item.instructions {
        out.push_str(&format!(
            "  Instructions: {}\n",
            if instructions { "yes" } else { "no" }
        ));
    }
    out.push('\n');

    if !detail.images.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Images")));
        for address in &detail.images {
            out.push_str(&format!("  {}\n", address));
        }
        out.push('\n');
    }
    if !detail.colors.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Colors")));
        for (color, address) in &detail.colors {
            out.push_str(&format!("  {}: {}\n", color, address));
        }
        out.push('\n');
    }

    out.push_str(&format_class_counts_text("Consists of", &detail.consists_of));
    out.push('\n');
    out.push_str(&format_class_counts_text("Appears in", &detail.appears_in));
    out
}

pub fn format_colors_text(colors: &BTreeSet<String>) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Known colors"));
    if colors.is_empty() {
        out.push_str("None.\n");
    }
    for color in colors {
        out.push_str(&format!("  {}\n", color));
    }
    out
}

pub fn format_validation_text(report: &ValidationReport) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Validation"));
    out.push_str(&format!(
        "  Categories: {}\n  Items: {}\n\n",
        report.category_count, report.item_count
    ));
    if !report.errors.is_empty() {
        out.push_str(&format!("{}\n", "Errors".red().bold()));
        for error in &report.errors {
            out.push_str(&format!("  - {}\n", error));
        }
        out.push('\n');
    }
    if !report.warnings.is_empty() {
        out.push_str(&format!("{}\n", "Warnings".yellow().bold()));
        for warning in &report.warnings {
            out.push_str(&format!("  - {}\n", warning));
        }
        out.push('\n');
    }
    if report.valid {
        out.push_str(&format!("{}\n", "Catalog is valid.".green()));
    } else {
        out.push_str(&format!(
            "{}\n",
            format!("Catalog is invalid: {} errors.", report.errors.len()).red()
        ));
    }
    out
}

pub fn format_status_text(status: &CatalogStatus) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Catalog Status"));
    match &status.root {
        Some(root) => out.push_str(&format!(
            "  Root: {} ({}), size {}\n\n",
            root.name,
            root.id,
            size_cell(root.size)
        )),
        None => out.push_str("  Root: not initialized\n\n"),
    }
    let stats = &status.stats;
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Table", "Rows"]);
    for (name, rows) in [
        ("Categories", stats.categories),
        ("Items", stats.items),
        ("Category edges", stats.category_edges),
        ("Memberships", stats.memberships),
        ("Compositions", stats.compositions),
        ("Images", stats.images),
    ] {
        table.add_row(vec![name.to_string(), rows.to_string()]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_size_report_text(report: &SizeReport) -> String {
    format!(
        "Recomputed {} categories under {} (root size {}) in {} ms.\n",
        report.categories_updated, report.root, report.root_size, report.duration_ms
    )
}

pub fn format_load_report_text(report: &BulkLoadReport) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Bulk load"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Kind", "Added"]);
    for (name, count) in [
        ("Categories", report.categories),
        ("Category edges", report.category_edges),
        ("Items", report.items),
        ("Items refreshed", report.items_updated),
        ("Memberships", report.memberships),
        ("Compositions", report.compositions),
        ("Images", report.images),
        ("Colors", report.colors),
    ] {
        table.add_row(vec![name.to_string(), count.to_string()]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Finished in {} ms.\n", report.duration_ms));
    out
}
