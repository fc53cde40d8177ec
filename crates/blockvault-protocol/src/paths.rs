//! Resource paths of the storage service API.
//!
//! Every path is a pure function of the identifiers passed in. The version
//! prefix is the only configurable piece.

use blockvault_model::{BlockId, FileId, StorageId, VaultId};

pub const DEFAULT_API_VERSION: &str = "v1.0";

/// Builds resource paths under one API version root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiPaths {
    root: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self::new(DEFAULT_API_VERSION)
    }
}

impl ApiPaths {
    pub fn new(version: &str) -> Self {
        Self {
            root: format!("/{}", version.trim_matches('/')),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn vaults(&self) -> String {
        format!("{}/vaults", self.root)
    }

    pub fn vault(&self, vault_id: &VaultId) -> String {
        format!("{}/vaults/{vault_id}", self.root)
    }

    pub fn blocks(&self, vault_id: &VaultId) -> String {
        format!("{}/blocks", self.vault(vault_id))
    }

    pub fn block(&self, vault_id: &VaultId, block_id: &BlockId) -> String {
        format!("{}/{block_id}", self.blocks(vault_id))
    }

    pub fn storage_blocks(&self, vault_id: &VaultId) -> String {
        format!("{}/storage/blocks", self.vault(vault_id))
    }

    pub fn storage_block(&self, vault_id: &VaultId, storage_id: &StorageId) -> String {
        format!("{}/{storage_id}", self.storage_blocks(vault_id))
    }

    pub fn files(&self, vault_id: &VaultId) -> String {
        format!("{}/files", self.vault(vault_id))
    }

    pub fn file(&self, vault_id: &VaultId, file_id: &FileId) -> String {
        format!("{}/{file_id}", self.files(vault_id))
    }

    /// Offset assignment and listing for the blocks of one file.
    pub fn file_blocks(&self, vault_id: &VaultId, file_id: &FileId) -> String {
        format!("{}/blocks", self.file(vault_id, file_id))
    }
}
