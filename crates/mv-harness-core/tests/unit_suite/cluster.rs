//! Cluster manager tests against a recording container runtime.

use async_trait::async_trait;
use parking_lot::Mutex;

use mv_harness_core::cluster::{ContainerId, ContainerInfo, ContainerSpec};
use mv_harness_core::{
    ClusterManager, ContainerRuntime, EndpointProbe, Error, HarnessConfig, Result,
};

/// Endpoint that accepts sessions immediately
struct ReadyEndpoint;

#[async_trait]
impl EndpointProbe for ReadyEndpoint {
    async fn release_version(&self, _config: &HarnessConfig) -> Result<String> {
        Ok("4.1.5".to_string())
    }
}

/// Runtime that records every call and keeps containers in memory
#[derive(Default)]
struct RecordingRuntime {
    containers: Mutex<Vec<ContainerInfo>>,
    calls: Mutex<Vec<String>>,
    specs: Mutex<Vec<ContainerSpec>>,
}

impl RecordingRuntime {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ContainerRuntime for RecordingRuntime {
    async fn run_detached(&self, spec: &ContainerSpec) -> Result<ContainerId> {
        let mut containers = self.containers.lock();
        let id = ContainerId(format!("{:064x}", containers.len() + 1));
        containers.push(ContainerInfo {
            id: id.clone(),
            image: spec.image.clone(),
        });
        self.specs.lock().push(spec.clone());
        self.calls.lock().push(format!("run {}", spec.image));
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<ContainerInfo>> {
        self.calls.lock().push("list".to_string());
        Ok(self.containers.lock().clone())
    }

    async fn remove_force(&self, id: &ContainerId) -> Result<()> {
        self.calls.lock().push(format!("rm {}", id));
        self.containers.lock().retain(|c| &c.id != id);
        Ok(())
    }
}

#[tokio::test]
async fn create_passes_container_settings() {
    let mut config = HarnessConfig::default();
    config.cluster.image = "cassandra:3.11".to_string();
    config
        .cluster
        .env
        .insert("MAX_HEAP_SIZE".to_string(), "512M".to_string());
    let manager = ClusterManager::new(RecordingRuntime::default(), config);

    let handle = manager.create().await.unwrap();

    assert_eq!(handle.contact_point, "127.0.0.1:9042");
    // ids are shown shortened
    assert_eq!(handle.container_id.to_string().len(), 12);

    let specs = manager.runtime().specs.lock().clone();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].image, "cassandra:3.11");
    assert_eq!(specs[0].network_mode, "host");
    assert_eq!(specs[0].env.get("MAX_HEAP_SIZE").map(String::as_str), Some("512M"));
}

#[tokio::test]
async fn create_then_destroy_removes_everything_created() {
    let manager = ClusterManager::new(RecordingRuntime::default(), HarnessConfig::default());

    manager.create().await.unwrap();
    manager.create().await.unwrap();
    assert_eq!(manager.destroy().await, 2);
    assert_eq!(manager.destroy().await, 0);

    let calls = manager.runtime().calls();
    assert_eq!(calls[0], "run cassandra:latest");
    assert_eq!(calls[1], "run cassandra:latest");
    assert_eq!(calls[2], "list");
    assert!(calls[3].starts_with("rm "));
    assert!(calls[4].starts_with("rm "));
    assert_eq!(calls[5], "list");
    assert_eq!(calls.len(), 6);
}

#[tokio::test]
async fn destroy_leaves_other_images_alone() {
    let runtime = RecordingRuntime::default();
    runtime.containers.lock().push(ContainerInfo {
        id: ContainerId("postgres0001".to_string()),
        image: "postgres:16".to_string(),
    });
    let manager = ClusterManager::new(runtime, HarnessConfig::default());

    manager.create().await.unwrap();
    assert_eq!(manager.destroy().await, 1);

    let remaining = manager.runtime().containers.lock().clone();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].image, "postgres:16");
}

#[tokio::test]
async fn with_cluster_tears_down_after_a_failed_check() {
    let manager =
        ClusterManager::new(RecordingRuntime::default(), HarnessConfig::default())
            .with_probe(ReadyEndpoint);

    let result = manager
        .with_cluster(|_| async {
            Err::<(), _>(Error::consistency("view created: alltimehigh rows", 10, 0))
        })
        .await;

    assert!(result.unwrap_err().is_consistency());
    assert!(manager.runtime().containers.lock().is_empty());

    // leftover sweep, create, sweep after the failure
    let calls = manager.runtime().calls();
    assert_eq!(calls[0], "list");
    assert_eq!(calls[1], "run cassandra:latest");
    assert_eq!(calls[2], "list");
    assert!(calls[3].starts_with("rm "));
    assert_eq!(calls.len(), 4);
}
