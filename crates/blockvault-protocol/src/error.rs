use thiserror::Error;

use blockvault_model::ModelError;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("missing response header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid response header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("encoding error: {0}")]
    Encode(String),

    #[error("response carried an invalid identifier: {0}")]
    Model(#[from] ModelError),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
