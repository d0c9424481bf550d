//! Cluster lifecycle tests against the local Docker daemon.

use mv_harness_core::cluster::ContainerRuntime;
use mv_harness_core::{ClusterManager, DockerApi, Error};

use super::common::{cluster_lock, harness_config};

#[tokio::test]
#[ignore = "requires Docker"]
async fn provision_then_destroy() {
    let _guard = cluster_lock().await;
    let config = harness_config().unwrap();
    let manager = ClusterManager::docker(config.clone()).unwrap();

    let handle = manager.provision().await.expect("cluster should come up");
    assert_eq!(handle.contact_point, config.cluster.contact_point);

    let store = manager.session().await.expect("session should open");
    let version = store.release_version().await.unwrap();
    assert!(!version.is_empty());

    assert!(manager.destroy().await >= 1);

    let runtime = DockerApi::connect().unwrap();
    let leftovers = runtime.list().await.unwrap();
    assert!(leftovers.iter().all(|c| c.image != config.cluster.image));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn create_is_not_idempotent() {
    let _guard = cluster_lock().await;
    let config = harness_config().unwrap();
    let manager = ClusterManager::docker(config).unwrap();

    manager.destroy().await;
    let first = manager.create().await.unwrap();
    let second = manager.create().await.unwrap();
    assert_ne!(first.container_id, second.container_id);

    // the second node cannot bind the host ports, but both containers exist
    assert_eq!(manager.destroy().await, 2);
    assert_eq!(manager.destroy().await, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn wait_without_cluster_is_not_ready() {
    let _guard = cluster_lock().await;
    let mut config = harness_config().unwrap();
    config.readiness.timeout_secs = 3;
    let manager = ClusterManager::docker(config).unwrap();

    manager.destroy().await;
    let err = manager.wait_until_connected().await.unwrap_err();
    assert!(matches!(err, Error::NotReady { .. }), "unexpected error: {err}");
}
