use thiserror::Error;

/// Fixed response body for webhook deliveries whose signature does not match.
///
/// Contains no secret material and does not echo the provided signature.
pub const SIGNATURE_MISMATCH_MESSAGE: &str =
    "Unable to authenticate message: Mismatch between signature and HMAC";

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),
}

/// GitHub App credential derivation errors
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid app key material: {reason}")]
    Config { reason: String },

    #[error("failed to sign app assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("installation token exchange rejected with status {status}")]
    UpstreamAuth { status: reqwest::StatusCode },

    #[error("request to github failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid installation token response")]
    InvalidTokenResponse,

    #[error("app assertion has expired and must not be reused")]
    AssertionExpired,

    #[error("operation requires app credentials, not an installation token")]
    WrongCredential,
}

/// Inbound webhook authentication errors
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("signature mismatch for delivery {delivery_id}")]
    SignatureMismatch { delivery_id: String },
}

/// Job submission errors. Logged by the webhook handler, never surfaced to the sender.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("webhook payload is not valid json: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("webhook payload has no installation id")]
    MissingInstallation,

    #[error("dispatcher request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("dispatcher rejected job with status {status}")]
    Rejected { status: reqwest::StatusCode },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileReadError(#[source] std::io::Error),

    #[error("invalid toml format: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("invalid port number: {port}")]
    InvalidPort { port: u16 },

    #[error("invalid host: {host}")]
    InvalidHost { host: String },

    #[error("missing required setting: {setting}")]
    MissingSetting { setting: String },

    #[error("invalid value for {setting}: {value}")]
    InvalidValue { setting: String, value: String },

    #[error("failed to read private key {path}: {source}")]
    PrivateKeyRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("validation error: {message}")]
    ValidationError { message: String },
}

/// Archive fetch errors for the build-side `fetch` command
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("api returned error status: {status}")]
    ApiError { status: reqwest::StatusCode },

    #[error("archive link response carried no redirect location")]
    MissingRedirect,

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Get a user-friendly error message for common HTTP status codes
    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::ApiError { status } => match status.as_u16() {
                401 => "unauthorized - installation token rejected".to_string(),
                403 => "forbidden - installation lacks contents permission".to_string(),
                404 => "not found - repository or ref does not exist for this installation"
                    .to_string(),
                _ => format!("api error - github returned status {status}"),
            },
            ClientError::RequestFailed(e) if e.is_timeout() => {
                "request timeout - github did not respond in time".to_string()
            }
            ClientError::RequestFailed(e) if e.is_connect() => {
                format!("connection failed - {e}")
            }
            _ => self.to_string(),
        }
    }
}

/// Server-specific errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server startup failed: {0}")]
    StartupError(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::{http::StatusCode, Json};
        use serde_json::json;
        use tracing::warn;

        match &self {
            AppError::Webhook(err) => warn!("Webhook rejected: {}", err),
            AppError::Credential(err) => warn!("Credential error: {}", err),
            _ => {}
        }

        // Signature mismatches always get the same plain body
        if let AppError::Webhook(WebhookError::SignatureMismatch { .. }) = &self {
            return (StatusCode::BAD_REQUEST, SIGNATURE_MISMATCH_MESSAGE).into_response();
        }

        let (status, error_message) = match &self {
            AppError::Credential(CredentialError::UpstreamAuth { .. }) => {
                (StatusCode::BAD_GATEWAY, "upstream authentication failed")
            }
            AppError::Credential(_) => (StatusCode::INTERNAL_SERVER_ERROR, "credential error"),
            AppError::Dispatch(_) => (StatusCode::BAD_GATEWAY, "dispatch failed"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration error"),
            AppError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[tokio::test]
    async fn test_signature_mismatch_renders_fixed_400() {
        let err = AppError::Webhook(WebhookError::SignatureMismatch {
            delivery_id: "abc-123".to_string(),
        });
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        assert_eq!(&body[..], SIGNATURE_MISMATCH_MESSAGE.as_bytes());
    }

    #[test]
    fn test_upstream_auth_maps_to_bad_gateway() {
        let err = AppError::Credential(CredentialError::UpstreamAuth {
            status: reqwest::StatusCode::UNAUTHORIZED,
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_user_friendly_messages() {
        let not_found = ClientError::ApiError {
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert!(not_found.user_friendly_message().starts_with("not found"));

        let other = ClientError::ApiError {
            status: reqwest::StatusCode::IM_A_TEAPOT,
        };
        assert!(other.user_friendly_message().contains("418"));

        assert_eq!(
            ClientError::MissingRedirect.user_friendly_message(),
            ClientError::MissingRedirect.to_string()
        );
    }
}
