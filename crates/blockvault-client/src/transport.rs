//! The HTTP seam between the client and the network.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use blockvault_protocol::Headers;

use crate::error::ClientResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Head,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub uri: String,
    pub headers: Headers,
    pub body: Option<Bytes>,
}

impl TransportRequest {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A fully buffered response.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Body of a streamed response, consumed one chunk at a time.
#[async_trait]
pub trait ChunkStream: Send {
    /// Next chunk, or `None` at the end of the body.
    async fn next_chunk(&mut self) -> ClientResult<Option<Bytes>>;
}

pub struct StreamingResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Box<dyn ChunkStream>,
}

impl StreamingResponse {
    /// Drain the remaining body as text.
    pub async fn text(mut self) -> ClientResult<String> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.body.next_chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Issues HTTP requests on behalf of the client.
///
/// Implementations report only transport failures as errors; any status code
/// the service returns is handed back for the client to classify.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> ClientResult<TransportResponse>;

    async fn send_streaming(&self, request: TransportRequest) -> ClientResult<StreamingResponse>;
}
