//! Error types for entity model operations.

use thiserror::Error;

/// Errors raised by identifier validation and collection bookkeeping.
///
/// All of these are local: they are produced before any request is issued.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The project id does not satisfy the project id grammar.
    #[error("invalid project id {value:?}: {reason}")]
    InvalidProject { value: String, reason: String },

    /// The vault id does not satisfy the vault id grammar.
    #[error("invalid vault id {value:?}: {reason}")]
    InvalidVault { value: String, reason: String },

    /// The file id does not satisfy the file id grammar.
    #[error("invalid file id {value:?}: {reason}")]
    InvalidFiles { value: String, reason: String },

    /// The metadata block id does not satisfy the block id grammar.
    #[error("invalid block id {value:?}: {reason}")]
    InvalidBlocks { value: String, reason: String },

    /// The storage block id does not satisfy the storage id grammar.
    #[error("invalid storage block id {value:?}: {reason}")]
    InvalidStorageBlocks { value: String, reason: String },

    /// A listing or offset parameter is out of range.
    #[error("parameter {name} rejected: {reason}")]
    ParameterConstraint { name: &'static str, reason: String },

    /// A value of the wrong kind was offered to a collection.
    #[error("{collection} can only contain {expected}")]
    TypeMismatch {
        collection: &'static str,
        expected: &'static str,
    },

    /// An entity scoped to a different project or vault was offered to a collection.
    #[error("{collection} is scoped to {expected}, got {actual}")]
    ScopeMismatch {
        collection: &'static str,
        expected: String,
        actual: String,
    },
}

/// Convenience type alias for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
