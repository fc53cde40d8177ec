//! Protocol mapping for the block vault client.
//!
//! Everything in this crate is pure: it turns identifiers into resource
//! paths, reads the response headers the client cares about, and encodes or
//! decodes request and response bodies. No I/O happens here.

pub mod codec;
pub mod error;
pub mod headers;
pub mod pagination;
pub mod paths;

pub use codec::{
    decode_block_batch, decode_file_blocks, decode_json, decode_vault_listing, encode_assignment,
    encode_block_batch,
};
pub use error::{ProtocolError, ProtocolResult};
pub use headers::Headers;
pub use pagination::{listing_path, marker_from_url, next_marker, Separator};
pub use paths::{ApiPaths, DEFAULT_API_VERSION};
