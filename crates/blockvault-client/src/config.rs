use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use blockvault_protocol::DEFAULT_API_VERSION;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_DOWNLOAD_CHUNK_SIZE: usize = 512 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host[:port]` of the service.
    pub api_host: String,
    pub ssl_enabled: bool,
    pub api_version: String,
    pub download_chunk_size: usize,
    /// Per-request timeout. Unset means the transport default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: "127.0.0.1:8080".to_string(),
            ssl_enabled: true,
            api_version: DEFAULT_API_VERSION.to_string(),
            download_chunk_size: DEFAULT_DOWNLOAD_CHUNK_SIZE,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> ClientResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> ClientResult<()> {
        let host = self.api_host.trim();
        if host.is_empty() {
            return Err(ClientError::Config("api_host must not be empty".into()));
        }
        if host.contains("://") || host.contains('/') {
            return Err(ClientError::Config(format!(
                "api_host must be host[:port], got {host:?}"
            )));
        }
        if self.api_version.is_empty() || self.api_version.contains('/') {
            return Err(ClientError::Config(format!(
                "invalid api_version {:?}",
                self.api_version
            )));
        }
        if self.download_chunk_size == 0 {
            return Err(ClientError::Config(
                "download_chunk_size must be greater than zero".into(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ClientError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn scheme(&self) -> &'static str {
        if self.ssl_enabled {
            "https"
        } else {
            "http"
        }
    }

    /// `scheme://host[:port]`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme(), self.api_host.trim())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ClientConfig::default();
        assert!(c.ssl_enabled);
        assert_eq!(c.api_version, "v1.0");
        assert_eq!(c.download_chunk_size, 512 * 1024);
        assert!(c.request_timeout().is_none());
        c.validate().unwrap();
    }

    #[test]
    fn base_url_follows_ssl_flag() {
        let mut c = ClientConfig::new("vault.example.com:9000");
        assert_eq!(c.base_url(), "https://vault.example.com:9000");
        c.ssl_enabled = false;
        assert_eq!(c.base_url(), "http://vault.example.com:9000");
    }

    #[test]
    fn toml_partial_uses_defaults() {
        let c = ClientConfig::from_toml_str(
            r#"
            api_host = "storage.local"
            ssl_enabled = false
            request_timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(c.api_host, "storage.local");
        assert!(!c.ssl_enabled);
        assert_eq!(c.api_version, "v1.0");
        assert_eq!(c.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_bad_values() {
        for source in [
            "api_host = \"\"",
            "api_host = \"https://h\"",
            "download_chunk_size = 0",
            "request_timeout_secs = 0",
            "api_version = \"v1/x\"",
        ] {
            let err = ClientConfig::from_toml_str(source).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "{source}");
        }
        assert!(matches!(
            ClientConfig::from_toml_str("api_host = 5").unwrap_err(),
            ClientError::Config(_)
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "api_host = \"h:1\"\ndownload_chunk_size = 4096\n").unwrap();
        let c = ClientConfig::load(&path).unwrap();
        assert_eq!(c.download_chunk_size, 4096);

        let missing = ClientConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ClientError::Io(_)));
    }
}
