use crate::auth::github::{AppClaims, AppIdentity};
use crate::error::CredentialError;
use crate::security::SecureString;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::debug;

/// Lifetime of an app assertion in seconds
pub const ASSERTION_LIFETIME_SECS: i64 = 60;

/// RS256 signer for GitHub App assertions
pub struct AppSigner {
    app_id: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for AppSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSigner")
            .field("app_id", &self.app_id)
            .field("encoding_key", &"[REDACTED]")
            .finish()
    }
}

impl AppSigner {
    /// Parse the identity's PEM key. Malformed key material is a configuration error.
    pub fn from_identity(identity: &AppIdentity) -> Result<Self, CredentialError> {
        if identity.app_id.trim().is_empty() {
            return Err(CredentialError::Config {
                reason: "app id is empty".to_string(),
            });
        }

        let encoding_key = EncodingKey::from_rsa_pem(identity.private_key.as_bytes()).map_err(
            |e| CredentialError::Config {
                reason: format!("private key is not a valid RSA PEM: {e}"),
            },
        )?;

        Ok(Self {
            app_id: identity.app_id.clone(),
            encoding_key,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Sign a fresh assertion issued now
    pub fn sign(&self) -> Result<SignedAppAssertion, CredentialError> {
        self.sign_at(Utc::now())
    }

    /// Sign a fresh assertion issued at `issued_at`
    pub fn sign_at(&self, issued_at: DateTime<Utc>) -> Result<SignedAppAssertion, CredentialError> {
        let iat = issued_at.timestamp();
        let claims = AppClaims {
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
            iss: self.app_id.clone(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(CredentialError::Signing)?;

        debug!("Signed app assertion for app {} (exp={})", self.app_id, claims.exp);

        Ok(SignedAppAssertion {
            token: SecureString::new(token),
            claims,
        })
    }
}

/// A signed, time-boxed app assertion. Valid only inside `[iat, exp)`.
#[derive(Debug, Clone)]
pub struct SignedAppAssertion {
    token: SecureString,
    claims: AppClaims,
}

impl SignedAppAssertion {
    pub fn claims(&self) -> &AppClaims {
        &self.claims
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.claims.exp
    }

    /// The compact JWT, or `AssertionExpired` once the expiry claim has passed
    pub fn bearer_at(&self, now: DateTime<Utc>) -> Result<&str, CredentialError> {
        if self.is_expired_at(now) {
            return Err(CredentialError::AssertionExpired);
        }
        Ok(self.token.as_str())
    }
}
