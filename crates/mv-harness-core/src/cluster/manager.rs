//! Cluster lifecycle manager.

use async_trait::async_trait;
use futures::FutureExt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

use super::{ContainerId, ContainerRuntime, ContainerSpec, DockerApi, EndpointProbe};
use crate::config::HarnessConfig;
use crate::readiness::{wait_for, Probe};
use crate::store::CqlStore;
use crate::Result;

/// A running database container and where to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHandle {
    pub container_id: ContainerId,
    pub contact_point: String,
}

/// Opens a CQL session and reads the server release
#[derive(Debug, Default, Clone, Copy)]
pub struct CqlProbe;

#[async_trait]
impl EndpointProbe for CqlProbe {
    async fn release_version(&self, config: &HarnessConfig) -> Result<String> {
        let store = CqlStore::connect(
            &config.cluster.contact_point,
            config.cluster.connect_timeout(),
            &config.schema,
        )
        .await?;
        store.release_version().await
    }
}

/// Creates, probes and destroys the database container.
///
/// The manager is the sole owner of containers of the configured image:
/// [`ClusterManager::destroy`] removes every one of them.
pub struct ClusterManager<R: ContainerRuntime = DockerApi> {
    runtime: R,
    probe: Box<dyn EndpointProbe>,
    config: HarnessConfig,
}

impl ClusterManager<DockerApi> {
    /// Manager talking to the local Docker daemon
    pub fn docker(config: HarnessConfig) -> Result<Self> {
        Ok(Self::new(DockerApi::connect()?, config))
    }
}

impl<R: ContainerRuntime> ClusterManager<R> {
    pub fn new(runtime: R, config: HarnessConfig) -> Self {
        Self {
            runtime,
            probe: Box::new(CqlProbe),
            config,
        }
    }

    /// Replace the readiness probe used by [`ClusterManager::wait_until_connected`].
    pub fn with_probe(mut self, probe: impl EndpointProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Launch one detached container on the configured network.
    ///
    /// Not idempotent: each call starts another container.
    pub async fn create(&self) -> Result<ClusterHandle> {
        let spec = ContainerSpec::from(&self.config.cluster);
        info!(
            "Starting {} container (network={})",
            spec.image, spec.network_mode
        );

        let container_id = self.runtime.run_detached(&spec).await?;
        info!("Container {} started", container_id);

        Ok(ClusterHandle {
            container_id,
            contact_point: self.config.cluster.contact_point.clone(),
        })
    }

    /// Force-remove every container of the configured image.
    ///
    /// Best effort: failures are logged and skipped. Returns how many
    /// containers were removed.
    pub async fn destroy(&self) -> usize {
        let image = &self.config.cluster.image;
        let containers = match self.runtime.list().await {
            Ok(containers) => containers,
            Err(e) => {
                warn!("Failed to list containers for {}: {}", image, e);
                return 0;
            }
        };

        let mut removed = 0;
        for container in containers.iter().filter(|c| &c.image == image) {
            match self.runtime.remove_force(&container.id).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove container {}: {}", container.id, e),
            }
        }

        if removed > 0 {
            info!("Removed {} {} container(s)", removed, image);
        }
        removed
    }

    /// Block until a CQL session can be opened, or the readiness deadline passes.
    pub async fn wait_until_connected(&self) -> Result<()> {
        let contact_point = &self.config.cluster.contact_point;
        info!("Waiting for CQL endpoint {}", contact_point);

        let version = wait_for(
            &format!("cql://{}", contact_point),
            &self.config.readiness,
            move |attempt| async move {
                let result = self.probe.release_version(&self.config).await;

                if let Err(e) = &result {
                    if attempt % 5 == 0 {
                        info!("Still waiting for {} (attempt {}): {}", contact_point, attempt, e);
                    }
                }
                Probe::from_result(result)
            },
        )
        .await?;

        info!("Connected to {} (release {})", contact_point, version);
        Ok(())
    }

    /// Open a fresh session; nothing is pooled across calls.
    pub async fn session(&self) -> Result<CqlStore> {
        CqlStore::connect(
            &self.config.cluster.contact_point,
            self.config.cluster.connect_timeout(),
            &self.config.schema,
        )
        .await
    }

    /// Remove leftovers, start a fresh container and wait for it.
    pub async fn provision(&self) -> Result<ClusterHandle> {
        self.destroy().await;
        let handle = self.create().await?;
        self.wait_until_connected().await?;
        Ok(handle)
    }

    /// Provision, run `body`, then destroy whatever the outcome.
    ///
    /// A panic in `body` is resumed after the container is removed.
    pub async fn with_cluster<F, Fut, T>(&self, body: F) -> Result<T>
    where
        F: FnOnce(ClusterHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let handle = match self.provision().await {
            Ok(handle) => handle,
            Err(e) => {
                self.destroy().await;
                return Err(e);
            }
        };

        let outcome = AssertUnwindSafe(body(handle)).catch_unwind().await;
        self.destroy().await;
        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}
