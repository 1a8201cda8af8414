pub mod github;
pub mod provider;
pub mod signing;

pub use github::{AppClaims, AppIdentity, InstallationId, InstallationToken};
pub use provider::{CredentialProvider, ProviderSettings};
pub use signing::{AppSigner, SignedAppAssertion, ASSERTION_LIFETIME_SECS};
