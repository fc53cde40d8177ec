//! Client for the block vault storage service.
//!
//! [`VaultClient`] drives the service's HTTP API and keeps a local
//! [`Vault`] model in step with every successful answer. Credentials come
//! from an [`Authenticator`], requests go through a [`Transport`] (by default
//! [`HttpTransport`]), and messages go to a [`Diagnostics`] sink.

pub mod assign;
pub mod auth;
mod blocks;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
mod files;
pub mod http;
mod storage;
pub mod transport;
mod vaults;

#[cfg(test)]
mod mock;

pub use assign::resolve_assignment;
pub use auth::{Authenticator, StaticAuthenticator};
pub use client::VaultClient;
pub use config::{ClientConfig, DEFAULT_DOWNLOAD_CHUNK_SIZE};
pub use diagnostics::{Diagnostics, MemoryDiagnostics, TracingDiagnostics};
pub use error::{ClientError, ClientResult};
pub use http::HttpTransport;
pub use transport::{
    ChunkStream, Method, StreamingResponse, Transport, TransportRequest, TransportResponse,
};

pub use blockvault_model::{
    Block, BlockId, BlockType, File, FileId, ProjectId, StorageId, Vault, VaultId, VaultStatus,
    Vaults,
};
