use crate::security::SecureString;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::info;

type HmacSha1 = Hmac<Sha1>;

/// Prefix GitHub puts in front of the hex digest in `X-Hub-Signature`
pub const SIGNATURE_PREFIX: &str = "sha1=";

/// Outcome of authenticating one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Rejected,
}

/// What to do when there is no secret configured or no signature supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignaturePolicy {
    /// Accept the delivery unverified
    #[default]
    Permissive,
    /// Reject the delivery
    Required,
}

/// `sha1=<lowercase hex HMAC-SHA1(secret, body)>`
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, hmac::digest::InvalidLength> {
    let mut mac = HmacSha1::new_from_slice(secret)?;
    mac.update(body);
    Ok(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Authenticate with the permissive fallback for missing secret or header
pub fn authenticate(
    raw_body: &[u8],
    provided_signature: Option<&[u8]>,
    secret: Option<&SecureString>,
) -> Verification {
    authenticate_with_policy(raw_body, provided_signature, secret, SignaturePolicy::Permissive)
}

/// A present header is always compared, whatever bytes it holds. Only an
/// absent or empty header counts as unsigned.
pub fn authenticate_with_policy(
    raw_body: &[u8],
    provided_signature: Option<&[u8]>,
    secret: Option<&SecureString>,
    policy: SignaturePolicy,
) -> Verification {
    let secret = secret.filter(|s| !s.is_empty());
    let provided = provided_signature.filter(|s| !s.is_empty());

    let (secret, provided) = match (secret, provided) {
        (Some(secret), Some(provided)) => (secret, provided),
        _ => {
            return match policy {
                SignaturePolicy::Permissive => {
                    info!("skipping authentication");
                    Verification::Verified
                }
                SignaturePolicy::Required => Verification::Rejected,
            };
        }
    };

    let Ok(expected) = sign(secret.as_bytes(), raw_body) else {
        return Verification::Rejected;
    };

    if constant_time_eq(provided, expected.as_bytes()) {
        Verification::Verified
    } else {
        Verification::Rejected
    }
}

/// Length mismatch returns early; equal lengths compare in constant time
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
