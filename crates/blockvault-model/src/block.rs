use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::ids::{BlockId, ProjectId, StorageId, VaultId};

/// Which tier a [`Block`] was discovered through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Addressed by content fingerprint through the metadata API.
    Metadata,
    /// Addressed by storage id through the storage API.
    Storage,
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => f.write_str("metadata"),
            Self::Storage => f.write_str("storage"),
        }
    }
}

/// A content-addressed chunk of data inside a vault.
///
/// The id matching `block_type` (block id for metadata blocks, storage id for
/// storage blocks) is fixed at construction. The other id, the reference
/// counters and the data are filled in as responses arrive.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    project_id: ProjectId,
    vault_id: VaultId,
    block_id: Option<BlockId>,
    storage_id: Option<StorageId>,
    block_type: BlockType,
    /// Raw content, present once uploaded locally or downloaded.
    pub data: Option<Bytes>,
    pub block_size: Option<u64>,
    /// Number of files referencing this block.
    pub ref_count: Option<u64>,
    /// Epoch seconds of the last reference change.
    pub ref_modified: Option<i64>,
    pub block_orphaned: Option<bool>,
}

impl Block {
    /// Create a block from either or both identifiers.
    ///
    /// The id named by `block_type` must be present.
    pub fn new(
        project_id: ProjectId,
        vault_id: VaultId,
        block_id: Option<BlockId>,
        storage_id: Option<StorageId>,
        block_type: BlockType,
    ) -> ModelResult<Self> {
        match (block_type, &block_id, &storage_id) {
            (_, None, None) => {
                return Err(ModelError::InvalidBlocks {
                    value: String::new(),
                    reason: "a block needs a block id or a storage id".into(),
                })
            }
            (BlockType::Metadata, None, Some(sid)) => {
                return Err(ModelError::InvalidBlocks {
                    value: sid.to_string(),
                    reason: "metadata blocks are keyed by block id".into(),
                })
            }
            (BlockType::Storage, Some(bid), None) => {
                return Err(ModelError::InvalidStorageBlocks {
                    value: bid.to_string(),
                    reason: "storage blocks are keyed by storage id".into(),
                })
            }
            _ => {}
        }
        Ok(Self {
            project_id,
            vault_id,
            block_id,
            storage_id,
            block_type,
            data: None,
            block_size: None,
            ref_count: None,
            ref_modified: None,
            block_orphaned: None,
        })
    }

    /// A metadata block known only by its fingerprint.
    pub fn metadata(project_id: ProjectId, vault_id: VaultId, block_id: BlockId) -> Self {
        Self {
            project_id,
            vault_id,
            block_id: Some(block_id),
            storage_id: None,
            block_type: BlockType::Metadata,
            data: None,
            block_size: None,
            ref_count: None,
            ref_modified: None,
            block_orphaned: None,
        }
    }

    /// A storage block known only by its storage id.
    pub fn storage(project_id: ProjectId, vault_id: VaultId, storage_id: StorageId) -> Self {
        Self {
            project_id,
            vault_id,
            block_id: None,
            storage_id: Some(storage_id),
            block_type: BlockType::Storage,
            data: None,
            block_size: None,
            ref_count: None,
            ref_modified: None,
            block_orphaned: None,
        }
    }

    /// Attach content, recording its size.
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        self.block_size = Some(data.len() as u64);
        self.data = Some(data);
        self
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    pub fn block_id(&self) -> Option<&BlockId> {
        self.block_id.as_ref()
    }

    pub fn storage_id(&self) -> Option<&StorageId> {
        self.storage_id.as_ref()
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    /// Record the storage id reported by the service for a metadata block.
    pub fn set_storage_id(&mut self, storage_id: Option<StorageId>) -> ModelResult<()> {
        if self.block_type == BlockType::Storage {
            return Err(ModelError::TypeMismatch {
                collection: "Block",
                expected: "a metadata block when replacing the storage id",
            });
        }
        self.storage_id = storage_id;
        Ok(())
    }

    /// Record the block id reported by the service for a storage block.
    pub fn set_block_id(&mut self, block_id: Option<BlockId>) -> ModelResult<()> {
        if self.block_type == BlockType::Metadata {
            return Err(ModelError::TypeMismatch {
                collection: "Block",
                expected: "a storage block when replacing the block id",
            });
        }
        self.block_id = block_id;
        Ok(())
    }

    /// Length of the locally held data, zero when none is held.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Bytes::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ref_modified_at(&self) -> Option<DateTime<Utc>> {
        self.ref_modified
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
