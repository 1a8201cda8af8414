use crate::config::Config;
use crate::dispatch::{dispatcher_from_config, BuildTrigger, JobDispatcher, TaskDefinition};
use crate::error::AppError;
use crate::server::handlers::{health_check, receive_webhook};
use crate::server::middleware::logging_middleware;
use crate::webhook::Pipeline;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// GitHub caps webhook payloads at 25 MB
pub const MAX_WEBHOOK_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub trigger: Arc<BuildTrigger>,
}

impl AppState {
    /// Create new application state with the dispatcher the configuration selects
    pub fn new(config: Config) -> Result<Self, AppError> {
        let dispatcher = dispatcher_from_config(&config.dispatcher)?;
        Ok(Self::with_dispatcher(config, dispatcher))
    }

    pub fn with_dispatcher(config: Config, dispatcher: Arc<dyn JobDispatcher>) -> Self {
        if config.webhook.secret.as_ref().map_or(true, |s| s.is_empty()) {
            warn!("No webhook secret configured, deliveries will not be authenticated");
        }
        if config.github.app_id.is_none() {
            warn!("No app id configured, build jobs will not receive APP_ID");
        }

        let pipeline = Pipeline::standard(
            config.webhook.secret.clone(),
            config.webhook.require_signature,
        );
        let definition =
            TaskDefinition::from_config(&config.dispatcher, config.github.app_id.clone());

        info!(
            "Application state initialized (cluster {}, require_signature {})",
            definition.cluster, config.webhook.require_signature
        );

        Self {
            pipeline: Arc::new(pipeline),
            trigger: Arc::new(BuildTrigger::new(definition, dispatcher)),
        }
    }
}

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware));

    Router::new()
        .route("/", post(receive_webhook))
        .route("/webhook", post(receive_webhook))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY_BYTES))
        .layer(middleware_stack)
        .with_state(state)
}
