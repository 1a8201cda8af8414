//! Build job submission.
//!
//! A verified delivery becomes one [`RunTaskRequest`] handed to a
//! [`JobDispatcher`]. The wire shape mirrors a container run-task call:
//! a cluster, who started it, and per-container command or environment
//! overrides.

pub mod http;
pub mod trigger;

use crate::error::DispatchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::{dispatcher_from_config, HttpJobDispatcher, LogOnlyDispatcher};
pub use trigger::{BuildTrigger, TaskDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTaskRequest {
    pub cluster_ref: String,
    pub started_by: String,
    pub container_overrides: Vec<ContainerOverride>,
}

impl RunTaskRequest {
    pub fn container(&self, name: &str) -> Option<&ContainerOverride> {
        self.container_overrides.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerOverride {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Vec<EnvVar>>,
}

impl ContainerOverride {
    pub fn env(&self, name: &str) -> Option<&str> {
        self.environment
            .as_ref()?
            .iter()
            .find(|var| var.name == name)
            .map(|var| var.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Identifier of a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHandle {
    pub run_id: String,
}

/// Submits build jobs to whatever runs containers
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    async fn run_task(&self, request: RunTaskRequest) -> Result<RunHandle, DispatchError>;
}
