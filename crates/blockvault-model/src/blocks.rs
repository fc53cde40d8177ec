//! Vault-scoped block collections.
//!
//! [`Blocks`] keys metadata blocks by fingerprint and [`StorageBlocks`] keys
//! storage blocks by storage id. Both are the same [`BlockMap`] over a
//! different [`BlockKey`], so the two grammars cannot be mixed up: a
//! `StorageBlocks` only ever accepts a `StorageId` key.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::block::{Block, BlockType};
use crate::error::{ModelError, ModelResult};
use crate::ids::{BlockId, ProjectId, StorageId, VaultId};

/// Identifier that keys a [`BlockMap`].
pub trait BlockKey: Clone + Eq + Hash + fmt::Display + fmt::Debug {
    /// Name used in error messages.
    const COLLECTION: &'static str;
    /// The only block type the collection accepts.
    const BLOCK_TYPE: BlockType;

    fn key_of(block: &Block) -> Option<&Self>;

    fn new_block(project_id: ProjectId, vault_id: VaultId, key: Self) -> Block;

    fn invalid(value: String, reason: &str) -> ModelError;
}

impl BlockKey for BlockId {
    const COLLECTION: &'static str = "Blocks";
    const BLOCK_TYPE: BlockType = BlockType::Metadata;

    fn key_of(block: &Block) -> Option<&Self> {
        block.block_id()
    }

    fn new_block(project_id: ProjectId, vault_id: VaultId, key: Self) -> Block {
        Block::metadata(project_id, vault_id, key)
    }

    fn invalid(value: String, reason: &str) -> ModelError {
        ModelError::InvalidBlocks { value, reason: reason.into() }
    }
}

impl BlockKey for StorageId {
    const COLLECTION: &'static str = "StorageBlocks";
    const BLOCK_TYPE: BlockType = BlockType::Storage;

    fn key_of(block: &Block) -> Option<&Self> {
        block.storage_id()
    }

    fn new_block(project_id: ProjectId, vault_id: VaultId, key: Self) -> Block {
        Block::storage(project_id, vault_id, key)
    }

    fn invalid(value: String, reason: &str) -> ModelError {
        ModelError::InvalidStorageBlocks { value, reason: reason.into() }
    }
}

/// Insertion-ordered map of blocks scoped to one vault, with a listing marker.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockMap<K: BlockKey> {
    project_id: ProjectId,
    vault_id: VaultId,
    marker: Option<K>,
    entries: IndexMap<K, Block>,
}

/// Metadata blocks keyed by block id.
pub type Blocks = BlockMap<BlockId>;

/// Storage blocks keyed by storage id.
pub type StorageBlocks = BlockMap<StorageId>;

impl<K: BlockKey> BlockMap<K> {
    pub fn new(project_id: ProjectId, vault_id: VaultId) -> Self {
        Self {
            project_id,
            vault_id,
            marker: None,
            entries: IndexMap::new(),
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    /// Cursor to resume listing from; `None` once the listing is exhausted.
    pub fn marker(&self) -> Option<&K> {
        self.marker.as_ref()
    }

    pub fn set_marker(&mut self, marker: Option<K>) {
        self.marker = marker;
    }

    fn check(&self, key: &K, block: &Block) -> ModelResult<()> {
        if block.block_type() != K::BLOCK_TYPE {
            return Err(ModelError::TypeMismatch {
                collection: K::COLLECTION,
                expected: match K::BLOCK_TYPE {
                    BlockType::Metadata => "metadata blocks",
                    BlockType::Storage => "storage blocks",
                },
            });
        }
        if block.project_id() != &self.project_id || block.vault_id() != &self.vault_id {
            return Err(ModelError::ScopeMismatch {
                collection: K::COLLECTION,
                expected: format!("{}/{}", self.project_id, self.vault_id),
                actual: format!("{}/{}", block.project_id(), block.vault_id()),
            });
        }
        match K::key_of(block) {
            Some(own) if own == key => Ok(()),
            Some(own) => Err(K::invalid(
                key.to_string(),
                &format!("key does not match the block's own id {own}"),
            )),
            None => Err(K::invalid(key.to_string(), "block carries no id for this collection")),
        }
    }

    /// Store `block` under `key`, returning any block it replaced.
    pub fn insert(&mut self, key: K, block: Block) -> ModelResult<Option<Block>> {
        self.check(&key, &block)?;
        Ok(self.entries.insert(key, block))
    }

    /// Store `block` under its own id.
    pub fn add(&mut self, block: Block) -> ModelResult<()> {
        let key = K::key_of(&block)
            .cloned()
            .ok_or_else(|| K::invalid(String::new(), "block carries no id for this collection"))?;
        self.insert(key, block)?;
        Ok(())
    }

    /// Merge many entries. Every entry is validated before any is stored.
    pub fn update<I>(&mut self, entries: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = (K, Block)>,
    {
        let entries: Vec<(K, Block)> = entries.into_iter().collect();
        for (key, block) in &entries {
            self.check(key, block)?;
        }
        self.entries.extend(entries);
        Ok(())
    }

    /// Block stored under `key`, creating a bare one if it is not tracked yet.
    pub fn get_or_insert(&mut self, key: K) -> &mut Block {
        let project_id = self.project_id.clone();
        let vault_id = self.vault_id.clone();
        self.entries
            .entry(key.clone())
            .or_insert_with(|| K::new_block(project_id, vault_id, key))
    }

    pub fn get(&self, key: &K) -> Option<&Block> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut Block> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Block)> {
        self.entries.iter()
    }
}

impl<'a, K: BlockKey> IntoIterator for &'a BlockMap<K> {
    type Item = (&'a K, &'a Block);
    type IntoIter = indexmap::map::Iter<'a, K, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE_UUID: &str = "9f3c1a52-7d4e-4b0a-8c61-2f5e9d7a4b13";

    fn project() -> ProjectId {
        ProjectId::new("proj").unwrap()
    }

    fn vault() -> VaultId {
        VaultId::new("vault").unwrap()
    }

    fn bid(n: u8) -> BlockId {
        BlockId::new(hex::encode([n; 20])).unwrap()
    }

    fn sid(n: u8) -> StorageId {
        StorageId::new(format!("{}_{FILE_UUID}", hex::encode([n; 20]))).unwrap()
    }

    #[test]
    fn scope_accessors() {
        let blocks = Blocks::new(project(), vault());
        assert_eq!(blocks.project_id().as_str(), "proj");
        assert_eq!(blocks.vault_id().as_str(), "vault");
        assert!(blocks.marker().is_none());
        assert!(blocks.is_empty());
    }

    #[test]
    fn add_and_get() {
        let mut blocks = Blocks::new(project(), vault());
        blocks.add(Block::metadata(project(), vault(), bid(1))).unwrap();
        assert!(blocks.contains(&bid(1)));
        assert_eq!(blocks.get(&bid(1)).unwrap().block_id(), Some(&bid(1)));
    }

    #[test]
    fn preserves_insertion_order() {
        let mut blocks = Blocks::new(project(), vault());
        for n in [9u8, 3, 5] {
            blocks.add(Block::metadata(project(), vault(), bid(n))).unwrap();
        }
        let order: Vec<BlockId> = blocks.keys().cloned().collect();
        assert_eq!(order, vec![bid(9), bid(3), bid(5)]);
    }

    #[test]
    fn rejects_wrong_block_type() {
        let mut blocks = Blocks::new(project(), vault());
        let err = blocks.add(Block::storage(project(), vault(), sid(1))).unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { collection: "Blocks", .. }));

        let mut storage = StorageBlocks::new(project(), vault());
        let err = storage.add(Block::metadata(project(), vault(), bid(1))).unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { collection: "StorageBlocks", .. }));
    }

    #[test]
    fn rejects_mismatched_key() {
        let mut blocks = Blocks::new(project(), vault());
        let err = blocks
            .insert(bid(2), Block::metadata(project(), vault(), bid(1)))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidBlocks { .. }));

        let mut storage = StorageBlocks::new(project(), vault());
        let err = storage
            .insert(sid(2), Block::storage(project(), vault(), sid(1)))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidStorageBlocks { .. }));
    }

    #[test]
    fn rejects_other_vault() {
        let mut blocks = Blocks::new(project(), vault());
        let other = VaultId::new("other").unwrap();
        let err = blocks.add(Block::metadata(project(), other, bid(1))).unwrap_err();
        assert!(matches!(err, ModelError::ScopeMismatch { .. }));
    }

    #[test]
    fn update_is_all_or_nothing() {
        let mut blocks = Blocks::new(project(), vault());
        let good = (bid(1), Block::metadata(project(), vault(), bid(1)));
        let bad = (bid(2), Block::metadata(project(), vault(), bid(3)));
        assert!(blocks.update(vec![good.clone(), bad]).is_err());
        assert!(blocks.is_empty());

        blocks.update(vec![good]).unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn get_or_insert_keeps_existing_state() {
        let mut blocks = Blocks::new(project(), vault());
        blocks
            .add(Block::metadata(project(), vault(), bid(1)).with_data(b"abc".to_vec()))
            .unwrap();
        let block = blocks.get_or_insert(bid(1));
        assert_eq!(block.len(), 3);

        let fresh = blocks.get_or_insert(bid(2));
        assert!(fresh.data.is_none());
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn storage_get_or_insert_builds_storage_block() {
        let mut storage = StorageBlocks::new(project(), vault());
        let block = storage.get_or_insert(sid(4));
        assert_eq!(block.block_type(), BlockType::Storage);
        assert!(block.block_id().is_none());
    }

    #[test]
    fn marker_roundtrip() {
        let mut blocks = Blocks::new(project(), vault());
        blocks.set_marker(Some(bid(7)));
        assert_eq!(blocks.marker(), Some(&bid(7)));
        blocks.set_marker(None);
        assert!(blocks.marker().is_none());
    }
}
