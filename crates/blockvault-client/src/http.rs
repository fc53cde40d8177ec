use async_trait::async_trait;
use bytes::Bytes;

use blockvault_protocol::Headers;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{
    ChunkStream, Method, StreamingResponse, Transport, TransportRequest, TransportResponse,
};

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn dispatch(&self, request: TransportRequest) -> ClientResult<reqwest::Response> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
        };
        let mut builder = self.client.request(method, &request.uri);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        builder.send().await.map_err(transport_error)
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

fn collect_headers(map: &reqwest::header::HeaderMap) -> Headers {
    map.iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect()
}

struct ResponseChunks(reqwest::Response);

#[async_trait]
impl ChunkStream for ResponseChunks {
    async fn next_chunk(&mut self) -> ClientResult<Option<Bytes>> {
        self.0.chunk().await.map_err(transport_error)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
        let response = self.dispatch(request).await?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    async fn send_streaming(&self, request: TransportRequest) -> ClientResult<StreamingResponse> {
        let response = self.dispatch(request).await?;
        Ok(StreamingResponse {
            status: response.status().as_u16(),
            headers: collect_headers(response.headers()),
            body: Box::new(ResponseChunks(response)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_timeout() {
        let mut config = ClientConfig::new("localhost:1");
        config.request_timeout_secs = Some(5);
        HttpTransport::new(&config).unwrap();
    }

    #[test]
    fn header_map_conversion() {
        let mut map = reqwest::header::HeaderMap::new();
        map.insert("x-next-batch", "http://h/v1.0/vaults?marker=v2".parse().unwrap());
        let headers = collect_headers(&map);
        assert_eq!(headers.get("x-next-batch"), Some("http://h/v1.0/vaults?marker=v2"));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let mut config = ClientConfig::new("127.0.0.1:9");
        config.ssl_enabled = false;
        config.request_timeout_secs = Some(2);
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport
            .send(TransportRequest::new(Method::Get, "http://127.0.0.1:9/v1.0/vaults"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
