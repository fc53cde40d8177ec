//! Listing queries and continuation markers.
//!
//! A listing request may carry `marker` then `limit` in its query string. A
//! listing response that has more pages carries an `X-Next-Batch` header whose
//! value is a URL; its `marker` query parameter resumes the listing.

use url::{ParseError, Url};

use crate::error::{ProtocolError, ProtocolResult};
use crate::headers::{Headers, X_NEXT_BATCH};

/// Resolves continuation headers that carry only a path and query.
const RELATIVE_BASE: &str = "http://localhost/";

/// Separator placed between `marker` and `limit`.
///
/// Block and file-block listings use a comma, storage-block listings an
/// ampersand. Both forms are what the service accepts today.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Separator {
    Comma,
    Ampersand,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Ampersand => "&",
        }
    }
}

/// Append `marker` and `limit` to a collection path.
pub fn listing_path(
    path: &str,
    marker: Option<&str>,
    limit: Option<u32>,
    separator: Separator,
) -> String {
    let mut params = Vec::with_capacity(2);
    if let Some(marker) = marker {
        params.push(format!("marker={marker}"));
    }
    if let Some(limit) = limit {
        params.push(format!("limit={limit}"));
    }
    if params.is_empty() {
        return path.to_string();
    }
    format!("{path}?{}", params.join(separator.as_str()))
}

/// Extract the `marker` query parameter from a continuation URL.
///
/// Relative URLs are accepted. A comma ends the value, so
/// `marker=a,limit=5` yields `a`.
pub fn marker_from_url(raw: &str) -> Option<String> {
    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(RELATIVE_BASE).ok()?;
            Url::options().base_url(Some(&base)).parse(raw).ok()?
        }
        Err(_) => return None,
    };
    parsed
        .query_pairs()
        .find(|(key, _)| key == "marker")
        .and_then(|(_, value)| value.split(',').next().map(str::to_string))
        .filter(|value| !value.is_empty())
}

/// Marker for the next page, or `None` when the response was the last page.
pub fn next_marker(headers: &Headers) -> ProtocolResult<Option<String>> {
    match headers.get(X_NEXT_BATCH) {
        None => Ok(None),
        Some(url) => marker_from_url(url)
            .map(Some)
            .ok_or_else(|| ProtocolError::InvalidHeader {
                name: X_NEXT_BATCH,
                reason: format!("no marker in {url:?}"),
            }),
    }
}
