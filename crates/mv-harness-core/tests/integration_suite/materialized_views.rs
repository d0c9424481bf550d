//! Materialized view scenarios against a live node.
//!
//! Every case provisions its own container, like a per-test fixture, and
//! removes it afterwards even when a check fails.

use rstest::rstest;

use mv_harness_core::{
    ClusterManager, Error, RecordGenerator, ScenarioCase, ScenarioKind, ScoreStore,
};

use super::common::{cluster_lock, generator, harness_config, run_case};

// ============================================================================
// Scenario Matrix
// ============================================================================

#[rstest]
#[case(0)]
#[case(10)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn create_from_table(#[case] initial: usize) {
    let case = ScenarioCase::new(ScenarioKind::CreateFromTable, initial, 0, 1);
    let report = run_case(case).await.expect("scenario should pass");
    assert!(report.success);
}

#[rstest]
#[case(0, 0)]
#[case(0, 10)]
#[case(10, 0)]
#[case(10, 10)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn read_from_view(#[case] initial: usize, #[case] additional: usize) {
    let case = ScenarioCase::new(ScenarioKind::ReadFromView, initial, additional, 1);
    let report = run_case(case).await.expect("scenario should pass");
    assert!(report.success);
}

#[rstest]
#[case(0, 10)]
#[case(10, 10)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn update_view_data(#[case] initial: usize, #[case] additional: usize) {
    let case = ScenarioCase::new(ScenarioKind::UpdateViewData, initial, additional, 1);
    let report = run_case(case).await.expect("scenario should pass");
    assert!(report.success);
}

#[rstest]
#[case(0, 10)]
#[case(10, 10)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn delete_view_data(#[case] initial: usize, #[case] additional: usize) {
    let case = ScenarioCase::new(ScenarioKind::DeleteViewData, initial, additional, 1);
    let report = run_case(case).await.expect("scenario should pass");
    assert!(report.success);
}

// ============================================================================
// View Catalog
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn views_are_scoped_to_the_current_keyspace() {
    let _guard = cluster_lock().await;
    let config = harness_config().unwrap();
    let manager = ClusterManager::docker(config.clone()).unwrap();

    let result = manager
        .with_cluster(|_| async {
            let store = manager.session().await?;
            let mut names = generator(21);

            let keyspaces = [names.keyspace_name(), names.keyspace_name()];
            for keyspace in &keyspaces {
                store.create_keyspace(keyspace).await?;
                store.use_keyspace(keyspace).await?;
                store.create_scores_table().await?;
                store.create_view().await?;
            }

            // only the view of the keyspace in use is listed
            let views = store.views().await?;
            assert_eq!(views.len(), 1);
            assert_eq!(views[0].keyspace_name, keyspaces[1]);
            assert_eq!(views[0].view_name, "alltimehigh");
            assert_eq!(views[0].base_table_name, "scores");
            Ok::<_, Error>(())
        })
        .await;

    result.expect("catalog checks should pass");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn empty_batches_skip_the_server() {
    let _guard = cluster_lock().await;
    let config = harness_config().unwrap();
    let manager = ClusterManager::docker(config.clone()).unwrap();

    let result = manager
        .with_cluster(|_| async {
            let store = manager.session().await?;
            let keyspace = RecordGenerator::new().keyspace_name();
            store.create_keyspace(&keyspace).await?;
            store.use_keyspace(&keyspace).await?;
            store.create_scores_table().await?;

            store.insert(&[]).await?;
            store.delete(&[]).await?;
            assert!(store.base_rows().await?.is_empty());
            Ok::<_, Error>(())
        })
        .await;

    result.expect("empty batches should succeed");
}
