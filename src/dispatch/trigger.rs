use crate::config::DispatcherConfig;
use crate::dispatch::{ContainerOverride, EnvVar, JobDispatcher, RunHandle, RunTaskRequest};
use crate::error::DispatchError;
use crate::webhook::{EventPayload, WebhookEvent};
use std::sync::Arc;
use tracing::{debug, info};

/// Static description of the job launched for each delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinition {
    pub cluster: String,
    pub started_by: String,
    pub notify_container: String,
    /// Where the notification container posts the raw payload; no notification without it
    pub notify_url: Option<String>,
    pub build_container: String,
    pub default_branch: String,
    /// Passed to the build container as `APP_ID`
    pub app_id: Option<String>,
}

impl TaskDefinition {
    pub fn from_config(config: &DispatcherConfig, app_id: Option<String>) -> Self {
        Self {
            cluster: config.cluster.clone(),
            started_by: config.started_by.clone(),
            notify_container: config.notify_container.clone(),
            notify_url: config.notify_url.clone().filter(|url| !url.trim().is_empty()),
            build_container: config.build_container.clone(),
            default_branch: config.default_branch.clone(),
            app_id,
        }
    }
}

/// Turns verified deliveries into build jobs
pub struct BuildTrigger {
    definition: TaskDefinition,
    dispatcher: Arc<dyn JobDispatcher>,
}

impl BuildTrigger {
    pub fn new(definition: TaskDefinition, dispatcher: Arc<dyn JobDispatcher>) -> Self {
        Self {
            definition,
            dispatcher,
        }
    }

    pub fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    /// Build the run-task request for `event` without submitting it
    pub fn build_request(&self, event: &WebhookEvent) -> Result<RunTaskRequest, DispatchError> {
        let payload = EventPayload::from_slice(&event.raw_body)?;
        let installation_id = payload
            .installation_id()
            .ok_or(DispatchError::MissingInstallation)?;

        let branch = payload
            .branch()
            .unwrap_or(self.definition.default_branch.as_str())
            .to_string();

        let mut overrides = Vec::with_capacity(2);

        if let Some(notify_url) = &self.definition.notify_url {
            overrides.push(ContainerOverride {
                name: self.definition.notify_container.clone(),
                command: Some(vec![
                    "-X".to_string(),
                    "POST".to_string(),
                    "-d".to_string(),
                    event.body_text(),
                    notify_url.clone(),
                ]),
                environment: None,
            });
        }

        let mut environment = Vec::with_capacity(4);
        if let Some(app_id) = &self.definition.app_id {
            environment.push(EnvVar::new("APP_ID", app_id.as_str()));
        }
        environment.push(EnvVar::new("INSTALLATION_ID", installation_id.to_string()));
        environment.push(EnvVar::new("BRANCH", branch));
        if let Some(repository) = payload.repository_name() {
            environment.push(EnvVar::new("REPOSITORY", repository));
        }

        overrides.push(ContainerOverride {
            name: self.definition.build_container.clone(),
            command: None,
            environment: Some(environment),
        });

        Ok(RunTaskRequest {
            cluster_ref: self.definition.cluster.clone(),
            started_by: self.definition.started_by.clone(),
            container_overrides: overrides,
        })
    }

    /// Submit one build job for a verified delivery. Single attempt.
    pub async fn trigger(&self, event: &WebhookEvent) -> Result<RunHandle, DispatchError> {
        let request = self.build_request(event)?;
        debug!(
            "Dispatching {} container overrides for delivery {}",
            request.container_overrides.len(),
            event.delivery_id
        );

        let handle = self.dispatcher.run_task(request).await?;
        info!(
            "Executed build task {} for delivery {}",
            handle.run_id, event.delivery_id
        );
        Ok(handle)
    }
}
