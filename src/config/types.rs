use crate::auth::{AppIdentity, InstallationId, ProviderSettings};
use crate::client::archive::ArchiveFormat;
use crate::error::ConfigError;
use crate::security::SecureString;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
    pub github: GithubConfig,
    pub dispatcher: DispatcherConfig,
    pub builder: BuilderConfig,
}

impl Config {
    /// Load configuration from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        crate::config::ConfigLoader::from_file(path)
    }

    /// The App identity, with the private key read from `github.private_key_path`
    pub fn app_identity(&self) -> Result<AppIdentity, ConfigError> {
        let app_id = self
            .github
            .app_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingSetting {
                setting: "github.app_id".to_string(),
            })?;

        let key_path = self
            .github
            .private_key_path
            .as_deref()
            .ok_or_else(|| ConfigError::MissingSetting {
                setting: "github.private_key_path".to_string(),
            })?;

        AppIdentity::from_pem_file(app_id, key_path)
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.host.trim();
        let is_hostname = !host.is_empty()
            && host.len() <= 253
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

        if host.parse::<IpAddr>().is_err() && !is_hostname {
            return Err(ConfigError::InvalidHost {
                host: self.host.clone(),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort { port: self.port });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Inbound webhook authentication
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared HMAC secret; `GITHUB_WEBHOOK_SECRET_TOKEN` overrides it
    pub secret: Option<SecureString>,
    /// Reject deliveries when the secret or the signature header is missing
    pub require_signature: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub app_id: Option<String>,
    pub private_key_path: Option<String>,
    pub api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        let settings = ProviderSettings::default();
        Self {
            app_id: None,
            private_key_path: None,
            api_url: settings.api_url,
            request_timeout_secs: settings.request_timeout.as_secs(),
        }
    }
}

impl GithubConfig {
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            api_url: self.api_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..Default::default()
        }
    }
}

/// Job dispatcher endpoint and the static task definition submitted to it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Run-task endpoint. Without one, jobs are only logged.
    pub endpoint: Option<String>,
    pub cluster: String,
    pub started_by: String,
    pub timeout_secs: u64,
    pub notify_container: String,
    pub notify_url: Option<String>,
    pub build_container: String,
    pub default_branch: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            cluster: "default".to_string(),
            started_by: "github".to_string(),
            timeout_secs: 10,
            notify_container: "post".to_string(),
            notify_url: None,
            build_container: "build".to_string(),
            default_branch: "main".to_string(),
        }
    }
}

/// Settings for the build-side `fetch` command
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub installation_id: Option<InstallationId>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub archive_format: ArchiveFormat,
    pub output: Option<String>,
    pub download_timeout_secs: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            installation_id: None,
            owner: None,
            repo: None,
            branch: None,
            archive_format: ArchiveFormat::Zipball,
            output: None,
            download_timeout_secs: 300,
        }
    }
}
