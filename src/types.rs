//! Core identifier and classification types for the catalog graph.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CategoryId: integer key of a theme node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        CategoryId(id)
    }
}

/// ItemId: opaque item token
///
/// Never parsed or assumed numeric; ordering is plain string ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId(id)
    }
}

/// Role of an item in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ItemClass {
    Set = 0,
    Part = 1,
    Minifigure = 2,
    Book = 3,
    Gear = 4,
    Catalog = 5,
    Instructions = 6,
    Box = 7,
}

impl ItemClass {
    pub const ALL: [ItemClass; 8] = [
        ItemClass::Set,
        ItemClass::Part,
        ItemClass::Minifigure,
        ItemClass::Book,
        ItemClass::Gear,
        ItemClass::Catalog,
        ItemClass::Instructions,
        ItemClass::Box,
    ];

    /// Parse a raw class code, rejecting anything outside 0-7
    pub fn from_code(code: i64) -> Result<Self, CatalogError> {
        match code {
            0 => Ok(ItemClass::Set),
            1 => Ok(ItemClass::Part),
            2 => Ok(ItemClass::Minifigure),
            3 => Ok(ItemClass::Book),
            4 => Ok(ItemClass::Gear),
            5 => Ok(ItemClass::Catalog),
            6 => Ok(ItemClass::Instructions),
            7 => Ok(ItemClass::Box),
            other => Err(CatalogError::InvalidClass(other)),
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    /// Plural label used in class-partitioned payloads
    pub fn label(self) -> &'static str {
        match self {
            ItemClass::Set => "Sets",
            ItemClass::Part => "Parts",
            ItemClass::Minifigure => "MF",
            ItemClass::Book => "Books",
            ItemClass::Gear => "Gear",
            ItemClass::Catalog => "Catalogs",
            ItemClass::Instructions => "Instructions",
            ItemClass::Box => "Boxes",
        }
    }
}

impl TryFrom<i64> for ItemClass {
    type Error = CatalogError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        ItemClass::from_code(code)
    }
}

impl From<ItemClass> for i64 {
    fn from(class: ItemClass) -> Self {
        class.code()
    }
}

impl fmt::Display for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference to either kind of node, used in mixed paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeRef {
    Category(CategoryId),
    Item(ItemId),
}

/// One step of a root-first path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub node: NodeRef,
    pub name: String,
}

impl PathStep {
    pub fn category(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            node: NodeRef::Category(id),
            name: name.into(),
        }
    }

    pub fn item(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            node: NodeRef::Item(id),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_codes_round_trip() {
        for class in ItemClass::ALL {
            assert_eq!(ItemClass::from_code(class.code()).unwrap(), class);
        }
    }

    #[test]
    fn test_class_out_of_range() {
        assert!(matches!(
            ItemClass::from_code(8),
            Err(CatalogError::InvalidClass(8))
        ));
        assert!(matches!(
            ItemClass::from_code(-1),
            Err(CatalogError::InvalidClass(-1))
        ));
    }

    #[test]
    fn test_class_serde_as_integer() {
        let json = serde_json::to_string(&ItemClass::Minifigure).unwrap();
        assert_eq!(json, "2");
        let parsed: ItemClass = serde_json::from_str("6").unwrap();
        assert_eq!(parsed, ItemClass::Instructions);
        assert!(serde_json::from_str::<ItemClass>("12").is_err());
    }

    #[test]
    fn test_item_id_is_opaque() {
        let id = ItemId::from("sw0001a");
        assert_eq!(id.as_str(), "sw0001a");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sw0001a\"");
        assert!(ItemId::from("10") < ItemId::from("9"));
    }
}
