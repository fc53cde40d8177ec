use thiserror::Error;

use blockvault_model::{BlockId, FileId, ModelError, VaultId};
use blockvault_protocol::ProtocolError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The service answered with a status the operation does not accept.
    #[error("{operation} failed ({status}): {body}")]
    OperationFailed {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("file {0} is not in the vault")]
    FileNotInVault(FileId),

    #[error("block {0} is not in the vault")]
    BlockNotInVault(BlockId),

    #[error("block {0} has no data to upload")]
    BlockDataMissing(BlockId),

    #[error("offset {offset} is not assigned in file {file_id}")]
    OffsetNotAssigned { file_id: FileId, offset: u64 },

    #[error("offset {offset} holds block {local}, not {requested}")]
    BlockOffsetMismatch {
        offset: u64,
        local: BlockId,
        requested: BlockId,
    },

    #[error("block assignment list must not be empty")]
    EmptyAssignment,

    #[error("file {0} has no offsets to assign")]
    NoOffsets(FileId),

    #[error("vault not found: {0}")]
    VaultNotFound(VaultId),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Status code of a rejected operation.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::OperationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
