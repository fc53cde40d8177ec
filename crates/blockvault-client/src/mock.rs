//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use blockvault_protocol::Headers;

use crate::auth::StaticAuthenticator;
use crate::client::VaultClient;
use crate::config::ClientConfig;
use crate::diagnostics::MemoryDiagnostics;
use crate::error::{ClientError, ClientResult};
use crate::transport::{
    ChunkStream, StreamingResponse, Transport, TransportRequest, TransportResponse,
};

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    requests: Mutex<Vec<TransportRequest>>,
    stream_chunk: Mutex<Option<usize>>,
    broken_streams: Mutex<bool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: u16, headers: Headers, body: impl Into<Bytes>) {
        self.responses.lock().unwrap().push_back(TransportResponse {
            status,
            headers,
            body: body.into(),
        });
    }

    pub fn push_status(&self, status: u16) {
        self.push(status, Headers::new(), Bytes::new());
    }

    /// Split streamed bodies into chunks of `size` bytes.
    pub fn stream_in_chunks_of(&self, size: usize) {
        *self.stream_chunk.lock().unwrap() = Some(size);
    }

    /// End every streamed body with a transport error instead of EOF.
    pub fn break_streams(&self) {
        *self.broken_streams.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.requests().pop().expect("no request was sent")
    }

    fn next(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::Transport("no scripted response".into()))
    }
}

struct ScriptedChunks {
    chunks: VecDeque<Bytes>,
    broken: bool,
}

#[async_trait]
impl ChunkStream for ScriptedChunks {
    async fn next_chunk(&mut self) -> ClientResult<Option<Bytes>> {
        match self.chunks.pop_front() {
            Some(chunk) => Ok(Some(chunk)),
            None if self.broken => Err(ClientError::Transport("connection reset".into())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
        self.next(request)
    }

    async fn send_streaming(&self, request: TransportRequest) -> ClientResult<StreamingResponse> {
        let response = self.next(request)?;
        let size = self
            .stream_chunk
            .lock()
            .unwrap()
            .unwrap_or(response.body.len().max(1));
        let chunks = response
            .body
            .chunks(size)
            .map(Bytes::copy_from_slice)
            .collect();
        Ok(StreamingResponse {
            status: response.status,
            headers: response.headers,
            body: Box::new(ScriptedChunks {
                chunks,
                broken: *self.broken_streams.lock().unwrap(),
            }),
        })
    }
}

/// Client for tenant `project_1` over a fresh mock transport.
pub fn test_client() -> (VaultClient, Arc<MockTransport>, Arc<MemoryDiagnostics>) {
    test_client_with(ClientConfig::new("vault.test"))
}

pub fn test_client_with(
    config: ClientConfig,
) -> (VaultClient, Arc<MockTransport>, Arc<MemoryDiagnostics>) {
    let mock = Arc::new(MockTransport::new());
    let diagnostics = Arc::new(MemoryDiagnostics::new());
    let client = VaultClient::new(
        config,
        Arc::new(StaticAuthenticator::new("project_1", "token-1")),
        mock.clone(),
    )
    .unwrap()
    .with_diagnostics(diagnostics.clone());
    (client, mock, diagnostics)
}

pub fn headers<const N: usize>(pairs: [(&str, &str); N]) -> Headers {
    pairs.into_iter().collect()
}
