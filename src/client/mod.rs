pub mod api;
pub mod archive;

pub use api::{AuthenticatedClient, Credential};
pub use archive::{download, ArchiveFormat, ArchiveRequest};

use crate::auth::{CredentialProvider, InstallationId};
use crate::config::Config;
use crate::error::{AppError, ClientError, ConfigError};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Everything the `fetch` command needs, resolved from config, environment and flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub installation_id: InstallationId,
    pub archive: ArchiveRequest,
    pub output: PathBuf,
    pub download_timeout: Duration,
}

impl FetchConfig {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let builder = &config.builder;
        let missing = |setting: &str| ConfigError::MissingSetting {
            setting: setting.to_string(),
        };

        let installation_id = builder
            .installation_id
            .ok_or_else(|| missing("builder.installation_id"))?;
        let owner = builder.owner.clone().ok_or_else(|| missing("builder.owner"))?;
        let repo = builder.repo.clone().ok_or_else(|| missing("builder.repo"))?;

        let output = builder
            .output
            .clone()
            .unwrap_or_else(|| builder.archive_format.default_file_name().to_string());

        Ok(Self {
            installation_id,
            archive: ArchiveRequest {
                owner,
                repo,
                format: builder.archive_format,
                git_ref: builder.branch.clone(),
            },
            output: PathBuf::from(output),
            download_timeout: Duration::from_secs(builder.download_timeout_secs),
        })
    }
}

/// Exchange the installation id for a token, resolve the archive link and download it
pub async fn run_fetch(
    provider: &CredentialProvider,
    config: &FetchConfig,
) -> Result<u64, ClientError> {
    let github = provider.as_installation(config.installation_id).await?;

    let link = github.archive_link(&config.archive).await?;
    info!(
        "Resolved {} link for {}/{} at {}",
        config.archive.format,
        config.archive.owner,
        config.archive.repo,
        config.archive.git_ref.as_deref().unwrap_or("default branch")
    );

    download(link, &config.output, config.download_timeout).await
}

/// Handle the `fetch` command from CLI
pub async fn handle_fetch_command(config: &Config) -> Result<(), AppError> {
    let fetch = FetchConfig::from_config(config)?;
    let identity = config.app_identity()?;
    let provider = CredentialProvider::new(&identity, config.github.provider_settings())?;

    match run_fetch(&provider, &fetch).await {
        Ok(bytes) => {
            println!("{} ({} bytes)", fetch.output.display(), bytes);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_friendly_message());
            Err(e.into())
        }
    }
}
