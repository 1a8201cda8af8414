//! Inbound GitHub webhook handling: event extraction, signature checks and
//! the ordered stage pipeline that runs before dispatch.

pub mod event;
pub mod pipeline;
pub mod signature;

pub use event::{EventPayload, WebhookEvent};
pub use pipeline::{AuthenticateRequest, LogRequest, Pipeline, RequestStage, StageOutcome};
pub use signature::{authenticate, authenticate_with_policy, SignaturePolicy, Verification};
