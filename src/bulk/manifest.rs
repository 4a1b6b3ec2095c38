//! Catalog manifests: serde-described datasets for the bulk loader
//!
//! Categories nest; ids left out are assigned in pre-order. Items listed under
//! a category are filed there, top-level items are filed only under the
//! categories they name.

use super::{BulkLoader, CompositionFact, NewCategory, NewItem};
use crate::error::CatalogError;
use crate::types::{CategoryId, ItemClass, ItemId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRoot {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ManifestItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ManifestCategory>,
}

impl ManifestCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            items: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ManifestCategory>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestItem {
    pub id: ItemId,
    pub name: String,
    /// Raw class code, 0-7
    pub class: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_first_release: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_last_release: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_dim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_dim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_dim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stud_dim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<bool>,
    /// Additional categories to file the item under
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryId>,
}

impl ManifestItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, class: ItemClass) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            class: class.code(),
            year_first_release: None,
            year_last_release: None,
            weight: None,
            item_dim: None,
            pack_dim: None,
            flat_dim: None,
            stud_dim: None,
            instructions: None,
            categories: Vec::new(),
        }
    }

    fn to_new_item(&self) -> Result<NewItem, CatalogError> {
        let mut item = NewItem::new(
            self.id.clone(),
            self.name.clone(),
            ItemClass::from_code(self.class)?,
        );
        let record = &mut item.record;
        record.year_first_release = self.year_first_release;
        record.year_last_release = self.year_last_release;
        record.weight = self.weight;
        record.item_dim = self.item_dim.clone();
        record.pack_dim = self.pack_dim.clone();
        record.flat_dim = self.flat_dim.clone();
        record.stud_dim = self.stud_dim.clone();
        record.instructions = self.instructions;
        Ok(item)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestLink {
    pub high: CategoryId,
    pub low: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestImage {
    pub item: ItemId,
    #[serde(default)]
    pub color: Option<String>,
    pub address: String,
}

/// A complete dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogManifest {
    /// Root to create; when absent the configured root is used (and created if missing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<ManifestRoot>,
    #[serde(default)]
    pub categories: Vec<ManifestCategory>,
    #[serde(default)]
    pub items: Vec<ManifestItem>,
    #[serde(default)]
    pub links: Vec<ManifestLink>,
    #[serde(default)]
    pub compositions: Vec<CompositionFact>,
    #[serde(default)]
    pub images: Vec<ManifestImage>,
    /// When set, every loaded item gets one image per known color, addressed by
    /// this template with `{id}` and `{color}` substituted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_template: Option<String>,
}

impl CatalogManifest {
    /// Read a manifest, choosing the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Err(CatalogError::InvalidInput(format!(
                "unsupported manifest format: {} (expected .json, .yaml or .yml)",
                path.display()
            ))),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(text)
            .map_err(|e| CatalogError::InvalidInput(format!("invalid JSON manifest: {}", e)))
    }

    pub fn from_yaml(text: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(text)
            .map_err(|e| CatalogError::InvalidInput(format!("invalid YAML manifest: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CatalogError::InvalidInput(format!("manifest not serializable: {}", e)))
    }
}

impl<'a> BulkLoader<'a> {
    /// Load a whole manifest
    ///
    /// Order: root, categories (pre-order), filed items, top-level items,
    /// extra links, compositions, explicit images, templated images. The first
    /// failure aborts the load.
    pub fn load_manifest(&mut self, manifest: &CatalogManifest) -> Result<(), CatalogError> {
        let root = match &manifest.root {
            Some(root) => self.create_root(root.id, root.name.clone())?.id,
            None => self.ensure_root()?.id,
        };

        let mut filed: Vec<(CategoryId, &ManifestItem)> = Vec::new();
        let mut stack: Vec<(CategoryId, &ManifestCategory)> = manifest
            .categories
            .iter()
            .rev()
            .map(|category| (root, category))
            .collect();
        while let Some((parent, category)) = stack.pop() {
            let id = self.add_category(NewCategory {
                id: category.id,
                name: category.name.clone(),
                parent,
            })?;
            filed.extend(category.items.iter().map(|item| (id, item)));
            stack.extend(category.children.iter().rev().map(|child| (id, child)));
        }

        for (category, item) in filed {
            self.load_item(item, Some(category))?;
        }
        for item in &manifest.items {
            self.load_item(item, None)?;
        }
        for link in &manifest.links {
            self.link_categories(link.high, link.low)?;
        }
        for fact in &manifest.compositions {
            self.add_composition(fact.clone())?;
        }
        for image in &manifest.images {
            self.add_image(&image.item, image.color.as_deref(), image.address.clone())?;
        }
        if let Some(template) = &manifest.image_template {
            let items = self.loaded_items().to_vec();
            for item in &items {
                self.add_images_for_known_colors(item, template)?;
            }
        }

        info!(
            categories = manifest.categories.len(),
            items = manifest.items.len(),
            compositions = manifest.compositions.len(),
            "Manifest loaded"
        );
        Ok(())
    }

    fn load_item(
        &mut self,
        item: &ManifestItem,
        category: Option<CategoryId>,
    ) -> Result<(), CatalogError> {
        let mut new_item = item.to_new_item()?;
        new_item.category = category;
        self.add_item(new_item)?;
        for extra in &item.categories {
            self.attach_item(*extra, &item.id)?;
        }
        Ok(())
    }
}
