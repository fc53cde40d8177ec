//! Vaults and the project-scoped vault collection.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blocks::{Blocks, StorageBlocks};
use crate::error::{ModelError, ModelResult};
use crate::file::Files;
use crate::ids::{ProjectId, VaultId};

/// Lifecycle of a vault as last observed by this client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultStatus {
    #[default]
    Unknown,
    Valid,
    Invalid,
    Created,
    Deleted,
}

impl VaultStatus {
    /// `Deleted` is terminal: once observed, no later status replaces it.
    pub fn advance(self, next: VaultStatus) -> VaultStatus {
        match self {
            Self::Deleted => Self::Deleted,
            _ => next,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Created => "created",
            Self::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// An isolated storage namespace owned by a project.
///
/// The vault owns the local shadow of its blocks, storage blocks and files.
/// Nothing is removed from these collections when the corresponding service
/// resource is deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct Vault {
    project_id: ProjectId,
    vault_id: VaultId,
    status: VaultStatus,
    blocks: Blocks,
    storage_blocks: StorageBlocks,
    files: Files,
    /// Statistics document from the last statistics request.
    pub statistics: Option<Map<String, Value>>,
}

impl Vault {
    pub fn new(project_id: ProjectId, vault_id: VaultId) -> Self {
        Self {
            blocks: Blocks::new(project_id.clone(), vault_id.clone()),
            storage_blocks: StorageBlocks::new(project_id.clone(), vault_id.clone()),
            files: Files::new(project_id.clone(), vault_id.clone()),
            project_id,
            vault_id,
            status: VaultStatus::Unknown,
            statistics: None,
        }
    }

    /// Validate raw identifiers and build an empty vault.
    pub fn parse(project_id: &str, vault_id: &str) -> ModelResult<Self> {
        Ok(Self::new(ProjectId::new(project_id)?, VaultId::new(vault_id)?))
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    pub fn status(&self) -> VaultStatus {
        self.status
    }

    /// Move to `next`, honouring the terminal `Deleted` state.
    pub fn set_status(&mut self, next: VaultStatus) {
        self.status = self.status.advance(next);
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Blocks {
        &mut self.blocks
    }

    pub fn storage_blocks(&self) -> &StorageBlocks {
        &self.storage_blocks
    }

    pub fn storage_blocks_mut(&mut self) -> &mut StorageBlocks {
        &mut self.storage_blocks
    }

    pub fn files(&self) -> &Files {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut Files {
        &mut self.files
    }
}

/// Vaults of one project, in the order they were first seen.
#[derive(Clone, Debug, PartialEq)]
pub struct Vaults {
    project_id: ProjectId,
    marker: Option<VaultId>,
    entries: IndexMap<VaultId, Vault>,
}

impl Vaults {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            marker: None,
            entries: IndexMap::new(),
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn marker(&self) -> Option<&VaultId> {
        self.marker.as_ref()
    }

    pub fn set_marker(&mut self, marker: Option<VaultId>) {
        self.marker = marker;
    }

    pub fn add(&mut self, vault: Vault) -> ModelResult<()> {
        if vault.project_id() != &self.project_id {
            return Err(ModelError::ScopeMismatch {
                collection: "Vaults",
                expected: self.project_id.to_string(),
                actual: vault.project_id().to_string(),
            });
        }
        self.entries.insert(vault.vault_id().clone(), vault);
        Ok(())
    }

    /// Vault with `vault_id`, creating an empty one if it is not tracked yet.
    pub fn get_or_insert(&mut self, vault_id: VaultId) -> &mut Vault {
        let project_id = self.project_id.clone();
        self.entries
            .entry(vault_id.clone())
            .or_insert_with(|| Vault::new(project_id, vault_id))
    }

    pub fn get(&self, vault_id: &VaultId) -> Option<&Vault> {
        self.entries.get(vault_id)
    }

    pub fn get_mut(&mut self, vault_id: &VaultId) -> Option<&mut Vault> {
        self.entries.get_mut(vault_id)
    }

    pub fn contains(&self, vault_id: &VaultId) -> bool {
        self.entries.contains_key(vault_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VaultId, &Vault)> {
        self.entries.iter()
    }
}
