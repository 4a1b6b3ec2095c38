//! Sled-backed catalog store
//!
//! One sled tree per table. Node records are bincode encoded. Edge tables keep
//! a forward and a reverse tree whose keys are order-preserving composite keys,
//! so every directional lookup is a prefix scan. Paired index writes happen in
//! a sled transaction; cascading deletes are a scan followed by those paired
//! removes and are not atomic as a whole.

use super::{
    CatalogStore, CategoryEdge, CategoryItemEdge, CategoryRecord, CompositionEdge, ItemImage,
    ItemRecord, StoreStats,
};
use crate::error::StorageError;
use crate::types::{CategoryId, ItemId};
use sled::transaction::{ConflictableTransactionResult, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;

const EMPTY: &[u8] = &[];

const CATEGORIES: &str = "categories";
const ITEMS: &str = "items";
const EDGES_DOWN: &str = "category_edges_down";
const EDGES_UP: &str = "category_edges_up";
const MEMBERS_BY_CATEGORY: &str = "members_by_category";
const MEMBERS_BY_ITEM: &str = "members_by_item";
const COMPOSITIONS: &str = "compositions";
const COMPOSITIONS_BY_PART: &str = "compositions_by_part";
const IMAGES: &str = "images";

/// Order-preserving key encoding.
///
/// Category ids are big-endian with the sign bit flipped. Strings escape 0x00
/// as `00 FF` and end with `00 01`, so a string's encoding is never a prefix
/// of a different string's encoding and byte order matches string order.
mod keys {
    use crate::types::CategoryId;

    pub fn push_category(buf: &mut Vec<u8>, id: CategoryId) {
        buf.extend_from_slice(&((id.0 as u64) ^ (1u64 << 63)).to_be_bytes());
    }

    pub fn take_category(bytes: &[u8]) -> Option<(CategoryId, &[u8])> {
        if bytes.len() < 8 {
            return None;
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[..8]);
        let id = (u64::from_be_bytes(raw) ^ (1u64 << 63)) as i64;
        Some((CategoryId(id), &bytes[8..]))
    }

    pub fn push_str(buf: &mut Vec<u8>, s: &str) {
        for &b in s.as_bytes() {
            if b == 0 {
                buf.extend_from_slice(&[0, 0xFF]);
            } else {
                buf.push(b);
            }
        }
        buf.extend_from_slice(&[0, 1]);
    }

    pub fn take_str(bytes: &[u8]) -> Option<(String, &[u8])> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                0 => match bytes.get(i + 1) {
                    Some(0xFF) => {
                        out.push(0);
                        i += 2;
                    }
                    Some(1) => {
                        let s = String::from_utf8(out).ok()?;
                        return Some((s, &bytes[i + 2..]));
                    }
                    _ => return None,
                },
                b => {
                    out.push(b);
                    i += 1;
                }
            }
        }
        None
    }

    pub fn category(id: CategoryId) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8);
        push_category(&mut buf, id);
        buf
    }

    pub fn category_pair(first: CategoryId, second: CategoryId) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16);
        push_category(&mut buf, first);
        push_category(&mut buf, second);
        buf
    }

    pub fn string(s: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(s.len() + 2);
        push_str(&mut buf, s);
        buf
    }

    pub fn category_then_str(id: CategoryId, s: &str) -> Vec<u8> {
        let mut buf = category(id);
        push_str(&mut buf, s);
        buf
    }

    pub fn str_then_category(s: &str, id: CategoryId) -> Vec<u8> {
        let mut buf = string(s);
        push_category(&mut buf, id);
        buf
    }

    pub fn strings(parts: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        for part in parts {
            push_str(&mut buf, part);
        }
        buf
    }
}

fn corrupt(tree: &'static str, message: impl Into<String>) -> StorageError {
    StorageError::CorruptKey {
        tree,
        message: message.into(),
    }
}

fn transaction_error(err: TransactionError<()>) -> StorageError {
    match err {
        TransactionError::Storage(e) => StorageError::Database(e),
        TransactionError::Abort(()) => StorageError::Serialization("transaction aborted".to_string()),
    }
}

/// Catalog store persisted in a sled database
pub struct SledCatalogStore {
    db: Db,
    categories: Tree,
    items: Tree,
    edges_down: Tree,
    edges_up: Tree,
    members_by_category: Tree,
    members_by_item: Tree,
    compositions: Tree,
    compositions_by_part: Tree,
    images: Tree,
}

impl SledCatalogStore {
    /// Open (or create) a store at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Open a throwaway store that is removed when dropped
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    pub fn from_db(db: Db) -> Result<Self, StorageError> {
        Ok(Self {
            categories: db.open_tree(CATEGORIES)?,
            items: db.open_tree(ITEMS)?,
            edges_down: db.open_tree(EDGES_DOWN)?,
            edges_up: db.open_tree(EDGES_UP)?,
            members_by_category: db.open_tree(MEMBERS_BY_CATEGORY)?,
            members_by_item: db.open_tree(MEMBERS_BY_ITEM)?,
            compositions: db.open_tree(COMPOSITIONS)?,
            compositions_by_part: db.open_tree(COMPOSITIONS_BY_PART)?,
            images: db.open_tree(IMAGES)?,
            db,
        })
    }

    /// Insert a forward/reverse key pair unless the forward key exists
    fn insert_pair(
        forward_tree: &Tree,
        reverse_tree: &Tree,
        forward: &[u8],
        value: &[u8],
        reverse: &[u8],
    ) -> Result<bool, StorageError> {
        (forward_tree, reverse_tree)
            .transaction(|(fwd, rev)| -> ConflictableTransactionResult<bool, ()> {
                if fwd.get(forward)?.is_some() {
                    return Ok(false);
                }
                fwd.insert(forward, value)?;
                rev.insert(reverse, EMPTY)?;
                Ok(true)
            })
            .map_err(transaction_error)
    }

    fn remove_pair(
        forward_tree: &Tree,
        reverse_tree: &Tree,
        forward: &[u8],
        reverse: &[u8],
    ) -> Result<bool, StorageError> {
        (forward_tree, reverse_tree)
            .transaction(|(fwd, rev)| -> ConflictableTransactionResult<bool, ()> {
                let removed = fwd.remove(forward)?.is_some();
                rev.remove(reverse)?;
                Ok(removed)
            })
            .map_err(transaction_error)
    }

    fn decode_category_pair(
        tree: &'static str,
        key: &[u8],
    ) -> Result<(CategoryId, CategoryId), StorageError> {
        let (first, rest) =
            keys::take_category(key).ok_or_else(|| corrupt(tree, "short category key"))?;
        let (second, _) =
            keys::take_category(rest).ok_or_else(|| corrupt(tree, "short category key"))?;
        Ok((first, second))
    }

    fn scan_category_pairs(
        tree: &Tree,
        name: &'static str,
        prefix: &[u8],
    ) -> Result<Vec<(CategoryId, CategoryId)>, StorageError> {
        let mut pairs = Vec::new();
        for entry in tree.scan_prefix(prefix) {
            let (key, _) = entry?;
            pairs.push(Self::decode_category_pair(name, &key)?);
        }
        Ok(pairs)
    }

    fn decode_composition_key(key: &[u8]) -> Result<(String, String, String), StorageError> {
        let (a, rest) =
            keys::take_str(key).ok_or_else(|| corrupt(COMPOSITIONS, "bad first id"))?;
        let (b, rest) =
            keys::take_str(rest).ok_or_else(|| corrupt(COMPOSITIONS, "bad second id"))?;
        let (color, _) =
            keys::take_str(rest).ok_or_else(|| corrupt(COMPOSITIONS, "bad color"))?;
        Ok((a, b, color))
    }
}

impl CatalogStore for SledCatalogStore {
    fn get_category(&self, id: CategoryId) -> Result<Option<CategoryRecord>, StorageError> {
        match self.categories.get(keys::category(id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_category(&self, record: &CategoryRecord) -> Result<(), StorageError> {
        let bytes = bincode::serialize(record)?;
        self.categories.insert(keys::category(record.id), bytes)?;
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<CategoryRecord>, StorageError> {
        let mut records = Vec::new();
        for entry in self.categories.iter() {
            let (_, value) = entry?;
            records.push(bincode::deserialize(&value)?);
        }
        Ok(records)
    }

    fn delete_category(&self, id: CategoryId) -> Result<bool, StorageError> {
        if self.categories.remove(keys::category(id))?.is_none() {
            return Ok(false);
        }
        let prefix = keys::category(id);
        for (high, low) in Self::scan_category_pairs(&self.edges_down, EDGES_DOWN, &prefix)? {
            self.remove_category_edge(CategoryEdge { high, low })?;
        }
        for (low, high) in Self::scan_category_pairs(&self.edges_up, EDGES_UP, &prefix)? {
            self.remove_category_edge(CategoryEdge { high, low })?;
        }
        for edge in self.memberships_of_category(id)? {
            self.remove_membership(&edge)?;
        }
        Ok(true)
    }

    fn get_item(&self, id: &ItemId) -> Result<Option<ItemRecord>, StorageError> {
        match self.items.get(keys::string(id.as_str()))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_item(&self, record: &ItemRecord) -> Result<(), StorageError> {
        let bytes = bincode::serialize(record)?;
        self.items.insert(keys::string(record.id.as_str()), bytes)?;
        Ok(())
    }

    fn list_items(&self) -> Result<Vec<ItemRecord>, StorageError> {
        let mut records = Vec::new();
        for entry in self.items.iter() {
            let (_, value) = entry?;
            records.push(bincode::deserialize(&value)?);
        }
        Ok(records)
    }

    fn delete_item(&self, id: &ItemId) -> Result<bool, StorageError> {
        if self.items.remove(keys::string(id.as_str()))?.is_none() {
            return Ok(false);
        }
        for edge in self.memberships_of_item(id)? {
            self.remove_membership(&edge)?;
        }
        for edge in self.compositions_by_set(id)? {
            self.remove_composition(&edge.set, &edge.part, &edge.color)?;
        }
        for edge in self.compositions_by_part(id)? {
            self.remove_composition(&edge.set, &edge.part, &edge.color)?;
        }
        for image in self.images_of_item(id)? {
            self.images
                .remove(keys::strings(&[image.item.as_str(), &image.color]))?;
        }
        Ok(true)
    }

    fn insert_category_edge(&self, edge: CategoryEdge) -> Result<bool, StorageError> {
        Self::insert_pair(
            &self.edges_down,
            &self.edges_up,
            &keys::category_pair(edge.high, edge.low),
            EMPTY,
            &keys::category_pair(edge.low, edge.high),
        )
    }

    fn remove_category_edge(&self, edge: CategoryEdge) -> Result<bool, StorageError> {
        Self::remove_pair(
            &self.edges_down,
            &self.edges_up,
            &keys::category_pair(edge.high, edge.low),
            &keys::category_pair(edge.low, edge.high),
        )
    }

    fn child_edges(&self, id: CategoryId) -> Result<Vec<CategoryEdge>, StorageError> {
        Ok(
            Self::scan_category_pairs(&self.edges_down, EDGES_DOWN, &keys::category(id))?
                .into_iter()
                .map(|(high, low)| CategoryEdge { high, low })
                .collect(),
        )
    }

    fn parent_edges(&self, id: CategoryId) -> Result<Vec<CategoryEdge>, StorageError> {
        Ok(
            Self::scan_category_pairs(&self.edges_up, EDGES_UP, &keys::category(id))?
                .into_iter()
                .map(|(low, high)| CategoryEdge { high, low })
                .collect(),
        )
    }

    fn list_category_edges(&self) -> Result<Vec<CategoryEdge>, StorageError> {
        Ok(Self::scan_category_pairs(&self.edges_down, EDGES_DOWN, EMPTY)?
            .into_iter()
            .map(|(high, low)| CategoryEdge { high, low })
            .collect())
    }

    fn insert_membership(&self, edge: &CategoryItemEdge) -> Result<bool, StorageError> {
        Self::insert_pair(
            &self.members_by_category,
            &self.members_by_item,
            &keys::category_then_str(edge.high, edge.item.as_str()),
            EMPTY,
            &keys::str_then_category(edge.item.as_str(), edge.high),
        )
    }

    fn remove_membership(&self, edge: &CategoryItemEdge) -> Result<bool, StorageError> {
        Self::remove_pair(
            &self.members_by_category,
            &self.members_by_item,
            &keys::category_then_str(edge.high, edge.item.as_str()),
            &keys::str_then_category(edge.item.as_str(), edge.high),
        )
    }

    fn memberships_of_category(
        &self,
        id: CategoryId,
    ) -> Result<Vec<CategoryItemEdge>, StorageError> {
        let mut edges = Vec::new();
        for entry in self.members_by_category.scan_prefix(keys::category(id)) {
            let (key, _) = entry?;
            let (high, rest) = keys::take_category(&key)
                .ok_or_else(|| corrupt(MEMBERS_BY_CATEGORY, "short category key"))?;
            let (item, _) = keys::take_str(rest)
                .ok_or_else(|| corrupt(MEMBERS_BY_CATEGORY, "bad item id"))?;
            edges.push(CategoryItemEdge {
                high,
                item: ItemId::new(item),
            });
        }
        Ok(edges)
    }

    fn memberships_of_item(&self, id: &ItemId) -> Result<Vec<CategoryItemEdge>, StorageError> {
        let mut edges = Vec::new();
        for entry in self.members_by_item.scan_prefix(keys::string(id.as_str())) {
            let (key, _) = entry?;
            let (item, rest) =
                keys::take_str(&key).ok_or_else(|| corrupt(MEMBERS_BY_ITEM, "bad item id"))?;
            let (high, _) = keys::take_category(rest)
                .ok_or_else(|| corrupt(MEMBERS_BY_ITEM, "short category key"))?;
            edges.push(CategoryItemEdge {
                high,
                item: ItemId::new(item),
            });
        }
        Ok(edges)
    }

    fn insert_composition(&self, edge: &CompositionEdge) -> Result<bool, StorageError> {
        let value = bincode::serialize(edge)?;
        Self::insert_pair(
            &self.compositions,
            &self.compositions_by_part,
            &keys::strings(&[edge.set.as_str(), edge.part.as_str(), &edge.color]),
            &value,
            &keys::strings(&[edge.part.as_str(), edge.set.as_str(), &edge.color]),
        )
    }

    fn remove_composition(
        &self,
        set: &ItemId,
        part: &ItemId,
        color: &str,
    ) -> Result<bool, StorageError> {
        Self::remove_pair(
            &self.compositions,
            &self.compositions_by_part,
            &keys::strings(&[set.as_str(), part.as_str(), color]),
            &keys::strings(&[part.as_str(), set.as_str(), color]),
        )
    }

    fn compositions_by_set(&self, id: &ItemId) -> Result<Vec<CompositionEdge>, StorageError> {
        let mut edges = Vec::new();
        for entry in self.compositions.scan_prefix(keys::string(id.as_str())) {
            let (_, value) = entry?;
            edges.push(bincode::deserialize(&value)?);
        }
        Ok(edges)
    }

    fn compositions_by_part(&self, id: &ItemId) -> Result<Vec<CompositionEdge>, StorageError> {
        let mut edges = Vec::new();
        for entry in self
            .compositions_by_part
            .scan_prefix(keys::string(id.as_str()))
        {
            let (key, _) = entry?;
            let (part, set, color) = Self::decode_composition_key(&key)?;
            let forward = keys::strings(&[&set, &part, &color]);
            match self.compositions.get(forward)? {
                Some(value) => edges.push(bincode::deserialize(&value)?),
                None => {
                    return Err(corrupt(
                        COMPOSITIONS_BY_PART,
                        format!("reverse entry without edge: {} -> {} ({})", set, part, color),
                    ))
                }
            }
        }
        Ok(edges)
    }

    fn list_compositions(&self) -> Result<Vec<CompositionEdge>, StorageError> {
        let mut edges = Vec::new();
        for entry in self.compositions.iter() {
            let (_, value) = entry?;
            edges.push(bincode::deserialize(&value)?);
        }
        Ok(edges)
    }

    fn insert_image(&self, image: &ItemImage) -> Result<bool, StorageError> {
        let key = keys::strings(&[image.item.as_str(), &image.color]);
        let swapped = self.images.compare_and_swap(
            key,
            None::<&[u8]>,
            Some(image.address.as_bytes()),
        )?;
        Ok(swapped.is_ok())
    }

    fn images_of_item(&self, id: &ItemId) -> Result<Vec<ItemImage>, StorageError> {
        let mut images = Vec::new();
        for entry in self.images.scan_prefix(keys::string(id.as_str())) {
            let (key, value) = entry?;
            let (item, rest) =
                keys::take_str(&key).ok_or_else(|| corrupt(IMAGES, "bad item id"))?;
            let (color, _) = keys::take_str(rest).ok_or_else(|| corrupt(IMAGES, "bad color"))?;
            let address = String::from_utf8(value.to_vec())
                .map_err(|e| corrupt(IMAGES, format!("address is not UTF-8: {}", e)))?;
            images.push(ItemImage {
                item: ItemId::new(item),
                color,
                address,
            });
        }
        Ok(images)
    }

    fn stats(&self) -> Result<StoreStats, StorageError> {
        Ok(StoreStats {
            categories: self.categories.len(),
            items: self.items.len(),
            category_edges: self.edges_down.len(),
            memberships: self.members_by_category.len(),
            compositions: self.compositions.len(),
            images: self.images.len(),
        })
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;
    use crate::types::ItemClass;

    #[test]
    fn test_uniqueness() {
        contract::uniqueness(&SledCatalogStore::temporary().unwrap());
    }

    #[test]
    fn test_directional_lookups() {
        contract::directional_lookups(&SledCatalogStore::temporary().unwrap());
    }

    #[test]
    fn test_cascade_deletes() {
        contract::cascade_deletes(&SledCatalogStore::temporary().unwrap());
    }

    #[test]
    fn test_size_writes() {
        contract::size_writes(&SledCatalogStore::temporary().unwrap());
    }

    #[test]
    fn test_category_key_order_matches_numeric_order() {
        let ids = [-5i64, -1, 0, 1, 2, 300, i64::MAX];
        let encoded: Vec<Vec<u8>> = ids.iter().map(|id| keys::category(CategoryId(*id))).collect();
        let mut sorted = encoded.clone();
        sorted.sort();
        assert_eq!(encoded, sorted);
        for id in ids {
            let key = keys::category(CategoryId(id));
            let (decoded, rest) = keys::take_category(&key).unwrap();
            assert_eq!(decoded, CategoryId(id));
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn test_string_keys_are_prefix_free_and_ordered() {
        let a = keys::string("S1");
        let b = keys::string("S10");
        assert!(!b.starts_with(&a));
        assert!(a < b);
        assert!(keys::string("AA") < keys::string("B"));

        let with_nul = "odd\0id";
        let key = keys::string(with_nul);
        let (decoded, rest) = keys::take_str(&key).unwrap();
        assert_eq!(decoded, with_nul);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_reopen_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SledCatalogStore::open(dir.path()).unwrap();
            store
                .put_category(&CategoryRecord::new(CategoryId(1), "BRICK Database"))
                .unwrap();
            store
                .put_item(&ItemRecord::new("75301", "X-Wing", ItemClass::Set))
                .unwrap();
            store
                .insert_membership(&CategoryItemEdge {
                    high: CategoryId(1),
                    item: ItemId::from("75301"),
                })
                .unwrap();
            store.flush().unwrap();
        }
        let store = SledCatalogStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get_category(CategoryId(1)).unwrap().unwrap().name,
            "BRICK Database"
        );
        assert_eq!(
            store.get_item(&ItemId::from("75301")).unwrap().unwrap().item_class,
            ItemClass::Set
        );
        assert_eq!(store.memberships_of_category(CategoryId(1)).unwrap().len(), 1);
    }
}
