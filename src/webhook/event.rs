use axum::body::Bytes;
use axum::http::HeaderMap;
use serde::Deserialize;

pub const DELIVERY_HEADER: &str = "x-github-delivery";
pub const EVENT_HEADER: &str = "x-github-event";
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// One inbound delivery. The raw body and signature bytes are kept intact for HMAC verification.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub kind: String,
    pub delivery_id: String,
    pub raw_body: Bytes,
    /// Raw `X-Hub-Signature` bytes, present even when not valid visible ASCII
    pub signature_header: Option<Bytes>,
}

impl WebhookEvent {
    pub fn from_parts(headers: &HeaderMap, raw_body: Bytes) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        Self {
            kind: header(EVENT_HEADER).unwrap_or_else(|| "unknown".to_string()),
            delivery_id: header(DELIVERY_HEADER).unwrap_or_else(|| "unknown".to_string()),
            raw_body,
            signature_header: headers
                .get(SIGNATURE_HEADER)
                .map(|value| Bytes::copy_from_slice(value.as_bytes())),
        }
    }

    /// Raw body as text, lossily decoded
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.raw_body).into_owned()
    }
}

/// The subset of a webhook payload needed to launch a build
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    pub installation: Option<InstallationRef>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub repository: Option<RepositoryRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallationRef {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryRef {
    pub full_name: Option<String>,
    pub default_branch: Option<String>,
}

impl EventPayload {
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    pub fn installation_id(&self) -> Option<u64> {
        self.installation.as_ref().map(|installation| installation.id)
    }

    pub fn repository_name(&self) -> Option<&str> {
        self.repository
            .as_ref()
            .and_then(|repo| repo.full_name.as_deref())
    }

    /// Branch named by `ref`, else the repository default branch
    pub fn branch(&self) -> Option<&str> {
        let from_ref = self.git_ref.as_deref().map(|r| r.strip_prefix("refs/heads/").unwrap_or(r));

        from_ref.filter(|b| !b.is_empty()).or_else(|| {
            self.repository
                .as_ref()
                .and_then(|repo| repo.default_branch.as_deref())
                .filter(|b| !b.is_empty())
        })
    }
}
