//! Header names and typed readers for the headers the client interprets.

use std::collections::BTreeMap;
use std::str::FromStr;

use blockvault_model::{BlockId, StorageId};

use crate::error::{ProtocolError, ProtocolResult};

pub const X_AUTH_TOKEN: &str = "x-auth-token";
pub const X_PROJECT_ID: &str = "x-project-id";
pub const X_NEXT_BATCH: &str = "x-next-batch";
pub const X_REF_MODIFIED: &str = "x-ref-modified";
pub const X_BLOCK_REFERENCE_COUNT: &str = "x-block-reference-count";
pub const X_BLOCK_SIZE: &str = "x-block-size";
pub const X_STORAGE_ID: &str = "x-storage-id";
pub const X_BLOCK_ID: &str = "x-block-id";
pub const X_BLOCK_ORPHANED: &str = "x-block-orphaned";
pub const X_FILE_ID: &str = "x-file-id";
pub const X_FILE_LENGTH: &str = "x-file-length";
pub const LOCATION: &str = "location";
pub const CONTENT_TYPE: &str = "content-type";
pub const CONTENT_LENGTH: &str = "content-length";

pub mod media {
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const MSGPACK: &str = "application/msgpack";
    pub const JSON: &str = "application/json";
}

/// The service writes this literal for an id it does not know.
const NONE_SENTINEL: &str = "None";

/// Header map with case-insensitive names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn require(&self, name: &'static str) -> ProtocolResult<&str> {
        self.get(name).ok_or(ProtocolError::MissingHeader(name))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Numeric header; absent or empty reads as zero.
fn number_or_zero<T>(headers: &Headers, name: &'static str) -> ProtocolResult<T>
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    match headers.get(name).map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(raw) => raw.parse().map_err(|e: T::Err| ProtocolError::InvalidHeader {
            name,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}

/// Identifier header; absent, empty or `None` reads as no id.
fn optional_id<T>(headers: &Headers, name: &'static str) -> ProtocolResult<Option<T>>
where
    T: FromStr<Err = blockvault_model::ModelError>,
{
    match headers.get(name).map(str::trim) {
        None | Some("") | Some(NONE_SENTINEL) => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ProtocolError::InvalidHeader {
            name,
            reason: e.to_string(),
        }),
    }
}

pub fn ref_modified(headers: &Headers) -> ProtocolResult<i64> {
    number_or_zero(headers, X_REF_MODIFIED)
}

pub fn ref_count(headers: &Headers) -> ProtocolResult<u64> {
    number_or_zero(headers, X_BLOCK_REFERENCE_COUNT)
}

pub fn block_size(headers: &Headers) -> ProtocolResult<u64> {
    number_or_zero(headers, X_BLOCK_SIZE)
}

pub fn storage_id(headers: &Headers) -> ProtocolResult<Option<StorageId>> {
    optional_id(headers, X_STORAGE_ID)
}

pub fn block_id(headers: &Headers) -> ProtocolResult<Option<BlockId>> {
    optional_id(headers, X_BLOCK_ID)
}

/// `X-Block-Orphaned`, a case-insensitive `true`/`false`.
pub fn orphaned(headers: &Headers) -> ProtocolResult<bool> {
    let raw = headers.require(X_BLOCK_ORPHANED)?.trim();
    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ProtocolError::InvalidHeader {
            name: X_BLOCK_ORPHANED,
            reason: format!("{raw:?} is not a boolean"),
        }),
    }
}
