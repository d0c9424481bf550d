//! Database cluster lifecycle.
//!
//! A cluster here is a single database container attached to the host
//! network. [`ClusterManager`] creates and destroys it through a
//! [`ContainerRuntime`] and polls an [`EndpointProbe`] until the node accepts
//! sessions.

mod docker;
mod manager;

pub use docker::DockerApi;
pub use manager::{ClusterHandle, ClusterManager, CqlProbe};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{ClusterConfig, HarnessConfig};
use crate::Result;

/// Runtime-assigned container identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form, like `docker ps`
        let short = self.0.get(..12).unwrap_or(&self.0);
        f.write_str(short)
    }
}

/// What to launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub network_mode: String,
    pub env: BTreeMap<String, String>,
    pub args: Vec<String>,
}

impl From<&ClusterConfig> for ContainerSpec {
    fn from(config: &ClusterConfig) -> Self {
        Self {
            image: config.image.clone(),
            network_mode: config.network_mode.clone(),
            env: config.env.clone(),
            args: config.args.clone(),
        }
    }
}

/// A container as listed by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: ContainerId,
    pub image: String,
}

/// Trait for container runtimes
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Start a detached container and return its id
    async fn run_detached(&self, spec: &ContainerSpec) -> Result<ContainerId>;

    /// List all containers, running or stopped
    async fn list(&self) -> Result<Vec<ContainerInfo>>;

    /// Stop and remove a container
    async fn remove_force(&self, id: &ContainerId) -> Result<()>;
}

/// Reports whether the database endpoint accepts sessions
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    /// Release version reported by a freshly opened session
    async fn release_version(&self, config: &HarnessConfig) -> Result<String>;
}
