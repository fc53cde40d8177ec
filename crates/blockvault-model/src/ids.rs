//! Validated identifier newtypes.
//!
//! Each identifier wraps a `String` that has passed the matching grammar in
//! [`crate::validation`]. Construction is the only place validation happens,
//! so anything holding a `VaultId` can put it on the wire as-is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::validation::{
    validate_file_id, validate_metadata_block_id, validate_project_id, validate_storage_block_id,
    validate_vault_id,
};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an identifier.
            pub fn new(value: impl Into<String>) -> ModelResult<Self> {
                let value = value.into();
                $validate(&value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> ModelResult<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ModelError;

            fn try_from(value: String) -> ModelResult<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ModelError;

            fn try_from(value: &str) -> ModelResult<Self> {
                Self::new(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

identifier!(
    /// Tenant project owning a set of vaults.
    ProjectId,
    validate_project_id
);

identifier!(
    /// Vault name, unique within a project.
    VaultId,
    validate_vault_id
);

identifier!(
    /// Content fingerprint of a metadata block (SHA-1, lowercase hex).
    BlockId,
    validate_metadata_block_id
);

identifier!(
    /// Opaque storage-tier identifier of a block.
    StorageId,
    validate_storage_block_id
);

identifier!(
    /// Service-assigned file identifier.
    FileId,
    validate_file_id
);
