use std::sync::Arc;

use blockvault_model::ProjectId;
use blockvault_protocol::headers::{X_AUTH_TOKEN, X_PROJECT_ID};
use blockvault_protocol::ApiPaths;

use crate::auth::Authenticator;
use crate::config::ClientConfig;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::{ClientError, ClientResult};
use crate::http::HttpTransport;
use crate::transport::{
    Method, StreamingResponse, Transport, TransportRequest, TransportResponse,
};

/// Client for the block vault service.
///
/// Operations take the local [`Vault`](blockvault_model::Vault) they act on and
/// bring it in line with the service's answer. A failed operation leaves the
/// local model untouched.
pub struct VaultClient {
    config: ClientConfig,
    paths: ApiPaths,
    auth: Arc<dyn Authenticator>,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl VaultClient {
    pub fn new(
        config: ClientConfig,
        auth: Arc<dyn Authenticator>,
        transport: Arc<dyn Transport>,
    ) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self {
            paths: ApiPaths::new(&config.api_version),
            config,
            auth,
            transport,
            diagnostics: Arc::new(TracingDiagnostics),
        })
    }

    /// Client over the default HTTP transport.
    pub fn connect(config: ClientConfig, auth: Arc<dyn Authenticator>) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::new(config, auth, Arc::new(transport))
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn paths(&self) -> &ApiPaths {
        &self.paths
    }

    /// The tenant id of the current credentials, as a project id.
    pub fn project_id(&self) -> ClientResult<ProjectId> {
        Ok(ProjectId::new(self.auth.tenant_id())?)
    }

    pub fn uri(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    pub(crate) fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    /// Start a request carrying the auth token and project id.
    pub(crate) async fn request(&self, method: Method, path: &str) -> ClientResult<TransportRequest> {
        let token = self.auth.auth_token().await?;
        Ok(TransportRequest::new(method, self.uri(path))
            .header(X_AUTH_TOKEN, token)
            .header(X_PROJECT_ID, self.auth.tenant_id()))
    }

    /// Send `request` and hand the response to `on_success` when its status
    /// is one of `accepted`.
    pub(crate) async fn execute<T, F>(
        &self,
        operation: &'static str,
        request: TransportRequest,
        accepted: &[u16],
        on_success: F,
    ) -> ClientResult<T>
    where
        F: FnOnce(TransportResponse) -> ClientResult<T>,
    {
        self.diagnostics
            .debug(operation, &format!("{} {}", request.method, request.uri));
        let response = self.transport.send(request).await?;
        self.diagnostics.debug(
            operation,
            &format!("status {} ({} body bytes)", response.status, response.body.len()),
        );
        if accepted.contains(&response.status) {
            on_success(response)
        } else {
            Err(ClientError::OperationFailed {
                operation,
                status: response.status,
                body: response.text(),
            })
        }
    }

    /// Streaming counterpart of [`execute`](Self::execute).
    pub(crate) async fn execute_streaming(
        &self,
        operation: &'static str,
        request: TransportRequest,
        accepted: &[u16],
    ) -> ClientResult<StreamingResponse> {
        self.diagnostics
            .debug(operation, &format!("{} {}", request.method, request.uri));
        let response = self.transport.send_streaming(request).await?;
        self.diagnostics
            .debug(operation, &format!("status {}", response.status));
        if accepted.contains(&response.status) {
            Ok(response)
        } else {
            let status = response.status;
            Err(ClientError::OperationFailed {
                operation,
                status,
                body: response.text().await?,
            })
        }
    }
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("config", &self.config)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
