use crate::error::{AppError, WebhookError};
use crate::security::SecureString;
use crate::webhook::event::WebhookEvent;
use crate::webhook::signature::{authenticate_with_policy, SignaturePolicy, Verification};
use axum::response::{IntoResponse, Response};
use tracing::info;

/// Result of running one stage
#[derive(Debug)]
pub enum StageOutcome {
    Continue,
    /// Stop the pipeline and answer with this response
    Respond(Response),
}

/// One step run against every delivery before dispatch
pub trait RequestStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, event: &WebhookEvent) -> StageOutcome;
}

/// Ordered list of stages; the first `Respond` wins
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn RequestStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// `LogRequest` followed by `AuthenticateRequest`
    pub fn standard(secret: Option<SecureString>, require_signature: bool) -> Self {
        Self::new()
            .with_stage(LogRequest)
            .with_stage(AuthenticateRequest::new(secret, require_signature))
    }

    pub fn with_stage(mut self, stage: impl RequestStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn run(&self, event: &WebhookEvent) -> StageOutcome {
        for stage in &self.stages {
            if let StageOutcome::Respond(response) = stage.process(event) {
                info!(
                    "Stage {} answered delivery {} with {}",
                    stage.name(),
                    event.delivery_id,
                    response.status()
                );
                return StageOutcome::Respond(response);
            }
        }
        StageOutcome::Continue
    }
}

/// Logs delivery id, event kind and body size
pub struct LogRequest;

impl RequestStage for LogRequest {
    fn name(&self) -> &'static str {
        "log_request"
    }

    fn process(&self, event: &WebhookEvent) -> StageOutcome {
        info!(
            "Received webhook from GitHub {} [{}] ({} bytes)",
            event.delivery_id,
            event.kind,
            event.raw_body.len()
        );
        StageOutcome::Continue
    }
}

/// Verifies `X-Hub-Signature` against the shared secret
pub struct AuthenticateRequest {
    secret: Option<SecureString>,
    policy: SignaturePolicy,
}

impl AuthenticateRequest {
    pub fn new(secret: Option<SecureString>, require_signature: bool) -> Self {
        let policy = if require_signature {
            SignaturePolicy::Required
        } else {
            SignaturePolicy::Permissive
        };
        Self { secret, policy }
    }
}

impl RequestStage for AuthenticateRequest {
    fn name(&self) -> &'static str {
        "authenticate_request"
    }

    fn process(&self, event: &WebhookEvent) -> StageOutcome {
        let verification = authenticate_with_policy(
            &event.raw_body,
            event.signature_header.as_deref(),
            self.secret.as_ref(),
            self.policy,
        );

        match verification {
            Verification::Verified => StageOutcome::Continue,
            Verification::Rejected => {
                let err = AppError::Webhook(WebhookError::SignatureMismatch {
                    delivery_id: event.delivery_id.clone(),
                });
                StageOutcome::Respond(err.into_response())
            }
        }
    }
}
