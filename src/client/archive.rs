use crate::client::api::AuthenticatedClient;
use crate::error::ClientError;
use reqwest::header::{CONTENT_DISPOSITION, LOCATION};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Repository archive format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    #[default]
    Zipball,
    Tarball,
}

impl ArchiveFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveFormat::Zipball => "zipball",
            ArchiveFormat::Tarball => "tarball",
        }
    }

    /// Output file name used when none is configured
    pub fn default_file_name(self) -> &'static str {
        match self {
            ArchiveFormat::Zipball => "archive.zip",
            ArchiveFormat::Tarball => "archive.tar.gz",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub owner: String,
    pub repo: String,
    pub format: ArchiveFormat,
    /// Branch, tag or sha. The repository default branch when absent.
    pub git_ref: Option<String>,
}

impl ArchiveRequest {
    fn path(&self) -> String {
        let mut path = format!("repos/{}/{}/{}", self.owner, self.repo, self.format);
        if let Some(git_ref) = self.git_ref.as_deref().filter(|r| !r.is_empty()) {
            path.push('/');
            path.push_str(git_ref);
        }
        path
    }
}

impl AuthenticatedClient {
    /// Resolve the short-lived download URL for a repository archive.
    ///
    /// GitHub answers with a redirect; the `Location` header is the link. Any
    /// answer without one, including a direct 200, is `MissingRedirect`.
    pub async fn archive_link(&self, request: &ArchiveRequest) -> Result<Url, ClientError> {
        let response = self
            .request(Method::GET, &request.path())?
            .send()
            .await?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or(ClientError::MissingRedirect)?;

            return response
                .url()
                .join(location)
                .map_err(|_| ClientError::MissingRedirect);
        }

        if status == StatusCode::OK {
            warn!("Archive link request was answered without a redirect");
            return Err(ClientError::MissingRedirect);
        }

        warn!(
            "Archive link for {}/{} failed with status {}",
            request.owner, request.repo, status
        );
        Err(ClientError::ApiError { status })
    }
}

/// Stream the archive at `url` into `path`, returning the number of bytes written.
///
/// Uses its own client that follows redirects. The link is pre-signed, so no
/// credentials are attached.
pub async fn download(url: Url, path: &Path, timeout: Duration) -> Result<u64, ClientError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .user_agent(concat!("gitbuild/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let host = url.host_str().unwrap_or("unknown").to_string();
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        warn!("Archive download from {} failed with status {}", host, status);
        return Err(ClientError::ApiError { status });
    }

    if let Some(file_name) = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(content_disposition_filename)
    {
        info!("Downloading {} from {}", file_name, host);
    }

    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    info!("Wrote {} bytes to {}", written, path.display());
    Ok(written)
}

/// `attachment; filename=octo-hello-abc123.zip` -> `octo-hello-abc123.zip`
fn content_disposition_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
