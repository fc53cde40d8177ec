use async_trait::async_trait;

use crate::error::ClientResult;

/// Source of credentials for every request.
///
/// The token is requested once per operation and never cached by the client,
/// so an implementation is free to refresh it whenever it expires.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Tenant id, sent as the project id.
    fn tenant_id(&self) -> String;

    async fn auth_token(&self) -> ClientResult<String>;
}

/// Fixed tenant and token.
#[derive(Clone, Debug)]
pub struct StaticAuthenticator {
    tenant_id: String,
    token: String,
}

impl StaticAuthenticator {
    pub fn new(tenant_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    fn tenant_id(&self) -> String {
        self.tenant_id.clone()
    }

    async fn auth_token(&self) -> ClientResult<String> {
        Ok(self.token.clone())
    }
}
