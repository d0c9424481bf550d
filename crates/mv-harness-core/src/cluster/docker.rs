//! Container runtime backed by the Docker Engine API.

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    StartContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerInspectResponse, ContainerSummary, HostConfig};
use bollard::Docker;
use futures::TryStreamExt;
use tracing::{debug, info, trace};

use super::{ContainerId, ContainerInfo, ContainerRuntime, ContainerSpec};
use crate::error::ContainerError;
use crate::Result;

/// Docker Engine API runtime
#[derive(Debug, Clone)]
pub struct DockerApi {
    client: Docker,
}

impl DockerApi {
    /// Connect using `DOCKER_HOST` or the platform's default socket.
    pub fn connect() -> Result<Self> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| ContainerError::Connect(e.to_string()))?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Docker) -> Self {
        Self { client }
    }

    /// Pull the image unless the daemon already has it.
    async fn ensure_image(&self, image: &str) -> Result<()> {
        if self.client.inspect_image(image).await.is_ok() {
            return Ok(());
        }

        info!("Pulling image {}", image);
        let options = CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        };
        self.client
            .create_image(Some(options), None, None)
            .try_for_each(|progress| async move {
                if let Some(status) = progress.status {
                    trace!("pull: {}", status);
                }
                Ok(())
            })
            .await
            .map_err(|e| ContainerError::api("pull image", e))?;
        Ok(())
    }

    /// Image the container was created from, as written at creation time.
    async fn configured_image(&self, summary: &ContainerSummary) -> Option<ContainerInfo> {
        let id = summary.id.as_deref()?;
        let inspect = match self.client.inspect_container(id, None).await {
            Ok(inspect) => Some(inspect),
            Err(e) => {
                debug!("Failed to inspect container {}: {}", id, e);
                None
            }
        };
        container_info(summary, inspect.as_ref())
    }
}

/// Create-container body for a spec.
pub(crate) fn container_config(spec: &ContainerSpec) -> Config<String> {
    let env: Vec<String> = spec
        .env
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    Config {
        image: Some(spec.image.clone()),
        env: (!env.is_empty()).then_some(env),
        cmd: (!spec.args.is_empty()).then(|| spec.args.clone()),
        host_config: Some(HostConfig {
            network_mode: Some(spec.network_mode.clone()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Prefer `Config.Image` over the summary's image, which the daemon reports
/// as an image id once the tag has moved.
pub(crate) fn container_info(
    summary: &ContainerSummary,
    inspect: Option<&ContainerInspectResponse>,
) -> Option<ContainerInfo> {
    let id = summary.id.clone()?;
    let image = inspect
        .and_then(|i| i.config.as_ref())
        .and_then(|c| c.image.clone())
        .or_else(|| summary.image.clone())?;

    Some(ContainerInfo {
        id: ContainerId(id),
        image,
    })
}

#[async_trait]
impl ContainerRuntime for DockerApi {
    async fn run_detached(&self, spec: &ContainerSpec) -> Result<ContainerId> {
        self.ensure_image(&spec.image).await?;

        let created = self
            .client
            .create_container(None::<CreateContainerOptions<String>>, container_config(spec))
            .await
            .map_err(|e| ContainerError::api("create container", e))?;
        for warning in &created.warnings {
            debug!("create {}: {}", spec.image, warning);
        }

        self.client
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| ContainerError::api("start container", e))?;

        let id = ContainerId(created.id);
        debug!("Started container {} from {}", id, spec.image);
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<ContainerInfo>> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(|e| ContainerError::api("list containers", e))?;

        let mut containers = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            if let Some(info) = self.configured_image(summary).await {
                containers.push(info);
            }
        }
        Ok(containers)
    }

    async fn remove_force(&self, id: &ContainerId) -> Result<()> {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        self.client
            .remove_container(&id.0, Some(options))
            .await
            .map_err(|e| ContainerError::api("remove container", e))?;
        debug!("Removed container {}", id);
        Ok(())
    }
}
