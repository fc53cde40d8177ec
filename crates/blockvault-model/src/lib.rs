//! Entity model for the block vault client.
//!
//! This crate holds the client-side shadow of the storage service's
//! resources. Nothing here performs I/O: the client crate mutates these types
//! as responses arrive.
//!
//! # Key Types
//!
//! - [`Vault`]: a project's storage namespace, owning its collections
//! - [`Block`]: a content-addressed chunk, known by block id and/or storage id
//! - [`Blocks`] / [`StorageBlocks`]: vault-scoped block maps with a listing marker
//! - [`File`] / [`Files`]: block assemblies keyed by byte offset
//! - [`Vaults`]: the vaults of one project
//!
//! Identifiers are validated newtypes ([`ProjectId`], [`VaultId`], [`BlockId`],
//! [`StorageId`], [`FileId`]); the grammars live in [`validation`].

pub mod block;
pub mod blocks;
pub mod error;
pub mod file;
pub mod ids;
pub mod validation;
pub mod vault;

pub use block::{Block, BlockType};
pub use blocks::{BlockKey, BlockMap, Blocks, StorageBlocks};
pub use error::{ModelError, ModelResult};
pub use file::{File, Files};
pub use ids::{BlockId, FileId, ProjectId, StorageId, VaultId};
pub use vault::{Vault, VaultStatus, Vaults};
