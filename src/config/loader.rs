use crate::config::types::Config;
use crate::error::ConfigError;
use crate::security::SecureString;
use std::fs;
use tracing::{debug, info, warn};

/// Environment variables consulted after the file is loaded
pub const ENV_APP_ID: &str = "APP_ID";
pub const ENV_PRIVATE_KEY_PATH: &str = "PRIVATE_KEY_PATH";
pub const ENV_INSTALLATION_ID: &str = "INSTALLATION_ID";
pub const ENV_BRANCH: &str = "BRANCH";
pub const ENV_REPOSITORY: &str = "REPOSITORY";
pub const ENV_WEBHOOK_SECRET: &str = "GITHUB_WEBHOOK_SECRET_TOKEN";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from `path` if given, otherwise start from defaults, then apply environment overrides
    pub fn load(path: Option<&str>) -> Result<Config, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No configuration file given, using defaults");
                Config::default()
            }
        };

        Self::apply_env_overrides(config)
    }

    /// Load configuration from file with path and content validation
    pub fn from_file(path: &str) -> Result<Config, ConfigError> {
        Self::validate_config_path(path)?;

        let content = fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read config file {}: {}", path, e);
            ConfigError::FileReadError(e)
        })?;

        Self::validate_config_content(&content)?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            warn!("Failed to parse TOML in {}: {}", path, e);
            ConfigError::TomlParseError(e)
        })?;

        info!("Configuration loaded successfully from {}", path);
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn apply_env_overrides(config: Config) -> Result<Config, ConfigError> {
        Self::apply_overrides_from(config, |name| std::env::var(name).ok())
    }

    fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(app_id) = get(ENV_APP_ID) {
            debug!("Overriding github.app_id from {}", ENV_APP_ID);
            config.github.app_id = Some(app_id.trim().to_string());
        }

        if let Some(path) = get(ENV_PRIVATE_KEY_PATH) {
            debug!("Overriding github.private_key_path from {}", ENV_PRIVATE_KEY_PATH);
            config.github.private_key_path = Some(path);
        }

        if let Some(raw) = get(ENV_INSTALLATION_ID) {
            let id = raw.parse().map_err(|_| ConfigError::InvalidValue {
                setting: ENV_INSTALLATION_ID.to_string(),
                value: raw.clone(),
            })?;
            config.builder.installation_id = Some(id);
        }

        if let Some(branch) = get(ENV_BRANCH) {
            config.builder.branch = Some(branch);
        }

        if let Some(raw) = get(ENV_REPOSITORY) {
            let (owner, repo) = raw
                .trim()
                .split_once('/')
                .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
                .ok_or_else(|| ConfigError::InvalidValue {
                    setting: ENV_REPOSITORY.to_string(),
                    value: raw.clone(),
                })?;
            config.builder.owner = Some(owner.to_string());
            config.builder.repo = Some(repo.to_string());
        }

        if let Some(secret) = get(ENV_WEBHOOK_SECRET) {
            debug!("Webhook secret taken from {}", ENV_WEBHOOK_SECRET);
            config.webhook.secret = Some(SecureString::new(secret));
        }

        Ok(config)
    }

    /// Validate configuration file path
    fn validate_config_path(path: &str) -> Result<(), ConfigError> {
        if path.contains("../") || path.contains("..\\") {
            warn!("Configuration path contains path traversal: {}", path);
            return Err(ConfigError::ValidationError {
                message: "configuration path contains path traversal sequences".to_string(),
            });
        }

        if path.chars().any(|c| c.is_control()) {
            warn!("Configuration path contains invalid characters");
            return Err(ConfigError::ValidationError {
                message: "configuration path contains invalid characters".to_string(),
            });
        }

        if path.len() > 1024 {
            warn!("Configuration path too long: {} characters", path.len());
            return Err(ConfigError::ValidationError {
                message: format!("configuration path too long: {} characters", path.len()),
            });
        }

        let lowered = path.to_lowercase();
        for pattern in ["/proc/", "/sys/", "/dev/", "\\\\"] {
            if lowered.contains(pattern) {
                warn!("Configuration path contains suspicious pattern: {}", pattern);
                return Err(ConfigError::ValidationError {
                    message: format!("configuration path contains suspicious pattern: {pattern}"),
                });
            }
        }

        Ok(())
    }

    /// Validate configuration file content before parsing
    fn validate_config_content(content: &str) -> Result<(), ConfigError> {
        // 1MB is far beyond any sane config
        if content.len() > 1024 * 1024 {
            warn!("Configuration file too large: {} bytes", content.len());
            return Err(ConfigError::ValidationError {
                message: format!("configuration file too large: {} bytes", content.len()),
            });
        }

        if content.contains('\0') {
            warn!("Configuration file contains binary data");
            return Err(ConfigError::ValidationError {
                message: "configuration file appears to contain binary data".to_string(),
            });
        }

        Ok(())
    }
}
