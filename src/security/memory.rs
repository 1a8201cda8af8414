use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secure container for credential material that zeroizes on drop.
///
/// Holds the GitHub App private key, signed app assertions, installation
/// tokens and the webhook secret. `Debug` never prints the contents.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Get a reference to the inner string
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the raw bytes, e.g. for use as an HMAC key
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_basic_operations() {
        let mut secure_str = SecureString::new("sensitive_data".to_string());

        assert_eq!(secure_str.as_str(), "sensitive_data");
        assert_eq!(secure_str.as_bytes(), b"sensitive_data");
        assert_eq!(secure_str.len(), 14);
        assert!(!secure_str.is_empty());

        secure_str.zeroize();
        assert!(secure_str.is_empty());
    }

    #[test]
    fn test_secure_string_from_conversions() {
        let from_string = SecureString::from("test".to_string());
        let from_str = SecureString::from("test");

        assert_eq!(from_string.as_str(), "test");
        assert_eq!(from_str.as_str(), "test");
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let secret = SecureString::from("ghs_supersecrettoken");
        let printed = format!("{secret:?}");

        assert_eq!(printed, "[REDACTED]");
        assert!(!printed.contains("ghs_"));
    }

    #[test]
    fn test_deserializes_from_plain_string() {
        #[derive(Deserialize)]
        struct Holder {
            secret: SecureString,
        }

        let holder: Holder = toml::from_str(r#"secret = "hunter2""#).unwrap();
        assert_eq!(holder.secret.as_str(), "hunter2");
    }
}
