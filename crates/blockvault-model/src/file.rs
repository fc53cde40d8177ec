//! Files: ordered assemblies of blocks at byte offsets.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::blocks::Blocks;
use crate::error::{ModelError, ModelResult};
use crate::ids::{BlockId, FileId, ProjectId, VaultId};
use crate::validation::validate_offset;

/// A file inside a vault.
///
/// `offsets` maps a byte offset to the block occupying it. The map is sparse
/// and ordered by offset; the length of a file is the number of assigned
/// offsets, not its byte length.
#[derive(Clone, Debug, PartialEq)]
pub struct File {
    project_id: ProjectId,
    vault_id: VaultId,
    file_id: FileId,
    url: Option<String>,
    offsets: BTreeMap<u64, BlockId>,
    /// Blocks the caller associated with this file.
    pub blocks: Blocks,
}

impl File {
    pub fn new(project_id: ProjectId, vault_id: VaultId, file_id: FileId) -> Self {
        let blocks = Blocks::new(project_id.clone(), vault_id.clone());
        Self {
            project_id,
            vault_id,
            file_id,
            url: None,
            offsets: BTreeMap::new(),
            blocks,
        }
    }

    /// Attach the resource url reported at creation.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn offsets(&self) -> &BTreeMap<u64, BlockId> {
        &self.offsets
    }

    /// Record that `block_id` occupies `offset`, returning the block it displaced.
    pub fn assign(&mut self, offset: u64, block_id: BlockId) -> Option<BlockId> {
        self.offsets.insert(offset, block_id)
    }

    /// Same as [`File::assign`] for an offset in its decimal wire form.
    pub fn assign_str(&mut self, offset: &str, block_id: BlockId) -> ModelResult<Option<BlockId>> {
        let offset = validate_offset(offset)?;
        Ok(self.assign(offset, block_id))
    }

    pub fn block_at(&self, offset: u64) -> Option<&BlockId> {
        self.offsets.get(&offset)
    }

    /// Number of assigned offsets.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Insertion-ordered map of files scoped to one vault.
#[derive(Clone, Debug, PartialEq)]
pub struct Files {
    project_id: ProjectId,
    vault_id: VaultId,
    marker: Option<FileId>,
    entries: IndexMap<FileId, File>,
}

impl Files {
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

    pub fn marker(&self) -> Option<&FileId> {
        self.marker.as_ref()
    }

    pub fn set_marker(&mut self, marker: Option<FileId>) {
        self.marker = marker;
    }

    fn check(&self, key: &FileId, file: &File) -> ModelResult<()> {
        if file.project_id() != &self.project_id || file.vault_id() != &self.vault_id {
            return Err(ModelError::ScopeMismatch {
                collection: "Files",
                expected: format!("{}/{}", self.project_id, self.vault_id),
                actual: format!("{}/{}", file.project_id(), file.vault_id()),
            });
        }
        if file.file_id() != key {
            return Err(ModelError::InvalidFiles {
                value: key.to_string(),
                reason: format!("key does not match the file's own id {}", file.file_id()),
            });
        }
        Ok(())
    }

    pub fn insert(&mut self, key: FileId, file: File) -> ModelResult<Option<File>> {
        self.check(&key, &file)?;
        Ok(self.entries.insert(key, file))
    }

    pub fn add(&mut self, file: File) -> ModelResult<()> {
        let key = file.file_id().clone();
        self.insert(key, file)?;
        Ok(())
    }

    /// Merge many entries. Every entry is validated before any is stored.
    pub fn update<I>(&mut self, entries: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = (FileId, File)>,
    {
        let entries: Vec<(FileId, File)> = entries.into_iter().collect();
        for (key, file) in &entries {
            self.check(key, file)?;
        }
        self.entries.extend(entries);
        Ok(())
    }

    pub fn get(&self, key: &FileId) -> Option<&File> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &FileId) -> Option<&mut File> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &FileId) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FileId, &File)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> (ProjectId, VaultId) {
        (ProjectId::new("proj").unwrap(), VaultId::new("vault").unwrap())
    }

    fn fid(tail: char) -> FileId {
        FileId::new(format!("9f3c1a52-7d4e-4b0a-8c61-2f5e9d7a4b1{tail}")).unwrap()
    }

    fn bid(n: u8) -> BlockId {
        BlockId::new(format!("{n:02x}").repeat(20)).unwrap()
    }

    #[test]
    fn length_counts_offsets() {
        let (p, v) = scope();
        let mut file = File::new(p, v, fid('3'));
        assert!(file.is_empty());
        file.assign(0, bid(1));
        file.assign(4096, bid(2));
        file.assign(4096, bid(3));
        assert_eq!(file.len(), 2);
        assert_eq!(file.block_at(4096), Some(&bid(3)));
    }

    #[test]
    fn offsets_are_ordered_numerically() {
        let (p, v) = scope();
        let mut file = File::new(p, v, fid('3'));
        file.assign_str("100", bid(1)).unwrap();
        file.assign_str("20", bid(2)).unwrap();
        file.assign_str("3", bid(3)).unwrap();
        let keys: Vec<u64> = file.offsets().keys().copied().collect();
        assert_eq!(keys, vec![3, 20, 100]);
    }

    #[test]
    fn assign_str_rejects_non_numeric() {
        let (p, v) = scope();
        let mut file = File::new(p, v, fid('3'));
        assert!(matches!(
            file.assign_str("ten", bid(1)),
            Err(ModelError::ParameterConstraint { name: "offset", .. })
        ));
    }

    #[test]
    fn files_reject_mismatched_key() {
        let (p, v) = scope();
        let mut files = Files::new(p.clone(), v.clone());
        let err = files.insert(fid('4'), File::new(p.clone(), v.clone(), fid('3'))).unwrap_err();
        assert!(matches!(err, ModelError::InvalidFiles { .. }));

        files.add(File::new(p, v, fid('3')).with_url("http://h/f")).unwrap();
        assert_eq!(files.get(&fid('3')).unwrap().url(), Some("http://h/f"));
    }

    #[test]
    fn files_reject_other_scope() {
        let (p, v) = scope();
        let mut files = Files::new(p.clone(), v);
        let other = VaultId::new("other").unwrap();
        assert!(matches!(
            files.add(File::new(p, other, fid('3'))),
            Err(ModelError::ScopeMismatch { collection: "Files", .. })
        ));
    }
}
