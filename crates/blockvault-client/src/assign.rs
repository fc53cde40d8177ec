//! Reconciliation of block-to-offset assignments against a file's local map.

use blockvault_model::{BlockId, FileId, Files};

use crate::error::{ClientError, ClientResult};

/// Pairs to submit when assigning blocks to a file.
///
/// With an explicit list, every offset must already be assigned locally to
/// the same block. Without one, the file's whole local map is submitted in
/// offset order.
pub fn resolve_assignment(
    files: &Files,
    file_id: &FileId,
    explicit: Option<&[(BlockId, u64)]>,
) -> ClientResult<Vec<(BlockId, u64)>> {
    let file = files
        .get(file_id)
        .ok_or_else(|| ClientError::FileNotInVault(file_id.clone()))?;

    match explicit {
        Some([]) => Err(ClientError::EmptyAssignment),
        Some(pairs) => {
            for (requested, offset) in pairs {
                let local = file.block_at(*offset).ok_or_else(|| ClientError::OffsetNotAssigned {
                    file_id: file_id.clone(),
                    offset: *offset,
                })?;
                if local != requested {
                    return Err(ClientError::BlockOffsetMismatch {
                        offset: *offset,
                        local: local.clone(),
                        requested: requested.clone(),
                    });
                }
            }
            Ok(pairs.to_vec())
        }
        None if file.is_empty() => Err(ClientError::NoOffsets(file_id.clone())),
        None => Ok(file
            .offsets()
            .iter()
            .map(|(offset, block_id)| (block_id.clone(), *offset))
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockvault_model::{File, ProjectId, VaultId};
    use proptest::prelude::*;

    const FILE: &str = "3f1c2a4e-8b7d-4c6e-9a5f-1b2c3d4e5f60";

    fn bid(n: u8) -> BlockId {
        BlockId::new(format!("{n:02x}").repeat(20)).unwrap()
    }

    fn fid() -> FileId {
        FileId::new(FILE).unwrap()
    }

    fn files_with(offsets: &[(u64, u8)]) -> Files {
        let p = ProjectId::new("project_1").unwrap();
        let v = VaultId::new("vault_1").unwrap();
        let mut file = File::new(p.clone(), v.clone(), fid());
        for (offset, n) in offsets {
            file.assign(*offset, bid(*n));
        }
        let mut files = Files::new(p, v);
        files.add(file).unwrap();
        files
    }

    #[test]
    fn implicit_uses_local_map_in_order() {
        let files = files_with(&[(100, 2), (0, 1)]);
        let pairs = resolve_assignment(&files, &fid(), None).unwrap();
        assert_eq!(pairs, vec![(bid(1), 0), (bid(2), 100)]);
    }

    #[test]
    fn explicit_must_match_local() {
        let files = files_with(&[(0, 1), (100, 2)]);
        let pairs = resolve_assignment(&files, &fid(), Some(&[(bid(2), 100)][..])).unwrap();
        assert_eq!(pairs, vec![(bid(2), 100)]);

        let err = resolve_assignment(&files, &fid(), Some(&[(bid(3), 100)][..])).unwrap_err();
        assert!(matches!(
            err,
            ClientError::BlockOffsetMismatch { offset: 100, ref local, ref requested }
                if *local == bid(2) && *requested == bid(3)
        ));

        let err = resolve_assignment(&files, &fid(), Some(&[(bid(1), 50)][..])).unwrap_err();
        assert!(matches!(err, ClientError::OffsetNotAssigned { offset: 50, .. }));
    }

    #[test]
    fn empty_inputs_rejected() {
        let files = files_with(&[(0, 1)]);
        assert!(matches!(
            resolve_assignment(&files, &fid(), Some(&[][..])).unwrap_err(),
            ClientError::EmptyAssignment
        ));

        let files = files_with(&[]);
        assert!(matches!(
            resolve_assignment(&files, &fid(), None).unwrap_err(),
            ClientError::NoOffsets(_)
        ));
    }

    #[test]
    fn unknown_file_checked_first() {
        let files = files_with(&[]);
        let other = FileId::new("00000000-0000-4000-8000-000000000000").unwrap();
        assert!(matches!(
            resolve_assignment(&files, &other, Some(&[][..])).unwrap_err(),
            ClientError::FileNotInVault(_)
        ));
    }

    proptest! {
        #[test]
        fn implicit_is_the_whole_map(offsets in proptest::collection::btree_map(any::<u64>(), any::<u8>(), 1..20)) {
            let entries: Vec<(u64, u8)> = offsets.iter().map(|(o, n)| (*o, *n)).collect();
            let files = files_with(&entries);
            let pairs = resolve_assignment(&files, &fid(), None).unwrap();
            prop_assert_eq!(pairs.len(), offsets.len());
            prop_assert!(pairs.windows(2).all(|w| w[0].1 < w[1].1));
            let explicit = resolve_assignment(&files, &fid(), Some(pairs.as_slice())).unwrap();
            prop_assert_eq!(explicit, pairs);
        }
    }
}
