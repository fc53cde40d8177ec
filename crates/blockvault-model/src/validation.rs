//! Identifier grammars used by the storage service.
//!
//! Every grammar is exposed twice: as a pure `is_valid_*` predicate and as a
//! `validate_*` function returning the matching [`ModelError`] kind. The
//! identifier newtypes in [`crate::ids`] call the `validate_*` functions, so a
//! value that reached a typed id has already passed its grammar.
//!
//! | Identifier | Grammar |
//! |---|---|
//! | project id | 1..=128 of `[A-Za-z0-9_-]` |
//! | vault id | 1..=128 of `[A-Za-z0-9_-]` |
//! | metadata block id | 40 lowercase hex characters |
//! | storage block id | `<block id>_<uuid>` |
//! | file id | hyphenated lowercase UUID |
//! | offset | `[0-9]+` |

use crate::error::{ModelError, ModelResult};

pub const PROJECT_ID_MAX_LEN: usize = 128;
pub const VAULT_ID_MAX_LEN: usize = 128;
pub const METADATA_BLOCK_ID_LEN: usize = 40;
const UUID_LEN: usize = 36;

/// Characters a marker may not contain, since they would break the query string.
const MARKER_FORBIDDEN: &[char] = &['&', ',', '?', '#', '='];

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn is_lower_hex(ch: char) -> bool {
    ch.is_ascii_digit() || ('a'..='f').contains(&ch)
}

fn is_name(value: &str, max_len: usize) -> bool {
    !value.is_empty() && value.len() <= max_len && value.chars().all(is_name_char)
}

pub fn is_valid_project_id(value: &str) -> bool {
    is_name(value, PROJECT_ID_MAX_LEN)
}

pub fn is_valid_vault_id(value: &str) -> bool {
    is_name(value, VAULT_ID_MAX_LEN)
}

pub fn is_valid_metadata_block_id(value: &str) -> bool {
    value.len() == METADATA_BLOCK_ID_LEN && value.chars().all(is_lower_hex)
}

/// Canonical hyphenated lowercase UUID (8-4-4-4-12).
pub fn is_valid_file_id(value: &str) -> bool {
    if value.len() != UUID_LEN {
        return false;
    }
    let groups: Vec<&str> = value.split('-').collect();
    let expected = [8, 4, 4, 4, 12];
    groups.len() == expected.len()
        && groups
            .iter()
            .zip(expected)
            .all(|(group, len)| group.len() == len && group.chars().all(is_lower_hex))
        && uuid::Uuid::try_parse(value).is_ok()
}

pub fn is_valid_storage_block_id(value: &str) -> bool {
    match value.split_once('_') {
        Some((block_id, suffix)) => {
            is_valid_metadata_block_id(block_id) && is_valid_file_id(suffix)
        }
        None => false,
    }
}

pub fn is_valid_offset(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit()) && value.parse::<u64>().is_ok()
}

pub fn is_valid_marker(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|ch| ch.is_whitespace() || MARKER_FORBIDDEN.contains(&ch))
}

fn name_reason(value: &str, max_len: usize) -> String {
    if value.is_empty() {
        "must not be empty".into()
    } else if value.len() > max_len {
        format!("must be at most {max_len} characters, got {}", value.len())
    } else {
        "may only contain ASCII letters, digits, '_' and '-'".into()
    }
}

pub fn validate_project_id(value: &str) -> ModelResult<()> {
    if is_valid_project_id(value) {
        return Ok(());
    }
    Err(ModelError::InvalidProject {
        value: value.to_string(),
        reason: name_reason(value, PROJECT_ID_MAX_LEN),
    })
}

pub fn validate_vault_id(value: &str) -> ModelResult<()> {
    if is_valid_vault_id(value) {
        return Ok(());
    }
    Err(ModelError::InvalidVault {
        value: value.to_string(),
        reason: name_reason(value, VAULT_ID_MAX_LEN),
    })
}

pub fn validate_metadata_block_id(value: &str) -> ModelResult<()> {
    if is_valid_metadata_block_id(value) {
        return Ok(());
    }
    Err(ModelError::InvalidBlocks {
        value: value.to_string(),
        reason: format!("must be {METADATA_BLOCK_ID_LEN} lowercase hex characters"),
    })
}

pub fn validate_storage_block_id(value: &str) -> ModelResult<()> {
    if is_valid_storage_block_id(value) {
        return Ok(());
    }
    Err(ModelError::InvalidStorageBlocks {
        value: value.to_string(),
        reason: "must be '<block id>_<uuid>'".into(),
    })
}

pub fn validate_file_id(value: &str) -> ModelResult<()> {
    if is_valid_file_id(value) {
        return Ok(());
    }
    Err(ModelError::InvalidFiles {
        value: value.to_string(),
        reason: "must be a hyphenated lowercase UUID".into(),
    })
}

pub fn validate_offset(value: &str) -> ModelResult<u64> {
    if is_valid_offset(value) {
        if let Ok(offset) = value.parse::<u64>() {
            return Ok(offset);
        }
    }
    Err(ModelError::ParameterConstraint {
        name: "offset",
        reason: format!("{value:?} is not a non-negative integer"),
    })
}

pub fn validate_limit(limit: u32) -> ModelResult<()> {
    if limit == 0 {
        return Err(ModelError::ParameterConstraint {
            name: "limit",
            reason: "must be greater than zero".into(),
        });
    }
    Ok(())
}

pub fn validate_marker(value: &str) -> ModelResult<()> {
    if is_valid_marker(value) {
        return Ok(());
    }
    Err(ModelError::ParameterConstraint {
        name: "marker",
        reason: format!("{value:?} is empty or contains query separators"),
    })
}
