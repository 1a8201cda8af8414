use crate::config::DispatcherConfig;
use crate::dispatch::{JobDispatcher, RunHandle, RunTaskRequest};
use crate::error::DispatchError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pick the dispatcher for this configuration: HTTP when an endpoint is set, log-only otherwise
pub fn dispatcher_from_config(
    config: &DispatcherConfig,
) -> Result<Arc<dyn JobDispatcher>, DispatchError> {
    match config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(endpoint) => {
            let timeout = Duration::from_secs(config.timeout_secs);
            Ok(Arc::new(HttpJobDispatcher::new(endpoint, timeout)?))
        }
        None => {
            warn!("No dispatcher endpoint configured, build jobs will only be logged");
            Ok(Arc::new(LogOnlyDispatcher::new()))
        }
    }
}

/// Posts run-task requests as JSON to a job runner endpoint
#[derive(Debug, Clone)]
pub struct HttpJobDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpJobDispatcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("gitbuild/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl JobDispatcher for HttpJobDispatcher {
    async fn run_task(&self, request: RunTaskRequest) -> Result<RunHandle, DispatchError> {
        debug!(
            "Submitting run task to {} on cluster {}",
            self.endpoint, request.cluster_ref
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Dispatcher request to {} failed: {}", self.endpoint, e);
                DispatchError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected { status });
        }

        let handle: RunHandle = response.json().await?;
        info!("Dispatcher accepted run {}", handle.run_id);
        Ok(handle)
    }
}

/// Stand-in used when no endpoint is configured. Never logs environment values.
#[derive(Debug, Default)]
pub struct LogOnlyDispatcher {
    submitted: AtomicU64,
}

impl LogOnlyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobDispatcher for LogOnlyDispatcher {
    async fn run_task(&self, request: RunTaskRequest) -> Result<RunHandle, DispatchError> {
        for container in &request.container_overrides {
            let env_names: Vec<&str> = container
                .environment
                .iter()
                .flatten()
                .map(|var| var.name.as_str())
                .collect();

            info!(
                "Would run container {} on cluster {} (command: {}, env: [{}])",
                container.name,
                request.cluster_ref,
                container.command.is_some(),
                env_names.join(", ")
            );
        }

        let n = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(RunHandle {
            run_id: format!("log-only-{n}"),
        })
    }
}
