use crate::auth::github::{InstallationId, InstallationToken};
use crate::auth::signing::SignedAppAssertion;
use crate::error::CredentialError;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder};
use tracing::{debug, warn};

/// GitHub REST API media type
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
/// Pinned GitHub REST API version
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Bearer credential carried by an [`AuthenticatedClient`]
#[derive(Debug, Clone)]
pub enum Credential {
    /// Signed app assertion, valid for 60 seconds
    App(SignedAppAssertion),
    /// Installation access token
    Installation(InstallationToken),
}

/// GitHub API client authenticated either as the App or as one installation
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    http: Client,
    api_url: String,
    credential: Credential,
}

impl AuthenticatedClient {
    pub(crate) fn new(http: Client, api_url: impl Into<String>, credential: Credential) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            credential,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn is_app(&self) -> bool {
        matches!(self.credential, Credential::App(_))
    }

    fn bearer(&self) -> Result<&str, CredentialError> {
        match &self.credential {
            Credential::App(assertion) => assertion.bearer_at(Utc::now()),
            Credential::Installation(token) => {
                if token.is_expired_at(Utc::now()) {
                    warn!("Installation token expired at {}", token.expires_at);
                }
                Ok(token.token.as_str())
            }
        }
    }

    /// Build a request against `path` (relative to the API root) with auth headers set
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CredentialError> {
        let url = format!("{}/{}", self.api_url, path.trim_start_matches('/'));
        let bearer = self.bearer()?;

        Ok(self
            .http
            .request(method, url)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION))
    }

    /// Exchange this client's app assertion for an installation access token.
    ///
    /// Single attempt; a rejected exchange is surfaced as `UpstreamAuth`.
    pub async fn create_installation_token(
        &self,
        installation_id: InstallationId,
    ) -> Result<InstallationToken, CredentialError> {
        if !self.is_app() {
            return Err(CredentialError::WrongCredential);
        }

        let path = format!("app/installations/{installation_id}/access_tokens");
        let response = self.request(Method::POST, &path)?.send().await.map_err(|e| {
            warn!("Installation token request failed: {}", e);
            CredentialError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "Installation token exchange for {} rejected with status {}",
                installation_id, status
            );
            return Err(CredentialError::UpstreamAuth { status });
        }

        let token: InstallationToken = response.json().await.map_err(|e| {
            warn!("Failed to parse installation token response: {}", e);
            CredentialError::InvalidTokenResponse
        })?;

        debug!(
            "Obtained installation token for {} (expires {})",
            installation_id, token.expires_at
        );
        Ok(token)
    }
}
