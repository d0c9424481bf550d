//! Scenario runner tests against the in-memory store.

use rstest::rstest;

use mv_harness_core::scenario::cases_for;
use mv_harness_core::{
    matrix, Error, MemoryStore, RecordGenerator, ScenarioCase, ScenarioKind, ScenarioRunner,
};

use super::helpers::fast_config;

// ============================================================================
// Scenario Matrix
// ============================================================================

#[rstest]
#[case(ScenarioKind::CreateFromTable, 0, 0)]
#[case(ScenarioKind::CreateFromTable, 10, 0)]
#[case(ScenarioKind::ReadFromView, 0, 0)]
#[case(ScenarioKind::ReadFromView, 0, 10)]
#[case(ScenarioKind::ReadFromView, 10, 0)]
#[case(ScenarioKind::ReadFromView, 10, 10)]
#[case(ScenarioKind::UpdateViewData, 0, 10)]
#[case(ScenarioKind::UpdateViewData, 10, 10)]
#[case(ScenarioKind::DeleteViewData, 0, 10)]
#[case(ScenarioKind::DeleteViewData, 10, 10)]
#[tokio::test]
async fn scenario_passes_on_consistent_store(
    #[case] kind: ScenarioKind,
    #[case] initial: usize,
    #[case] additional: usize,
) {
    let store = MemoryStore::new();
    let config = fast_config();
    let mut runner =
        ScenarioRunner::new(&store, &config).with_generator(RecordGenerator::seeded(42));

    let case = ScenarioCase::new(kind, initial, additional, 1);
    let report = runner.run(&case).await.unwrap();

    assert!(report.success);
    assert_eq!(report.scenario, kind);
    assert_eq!(report.label, case.to_string());
    assert_eq!(report.keyspace.len(), 10);
    assert!(report.checks_passed >= 5);
}

#[rstest]
#[case(1)]
#[case(4)]
#[tokio::test]
async fn lagging_view_settles_before_checks(#[case] lag: u32) {
    let store = MemoryStore::with_view_lag(lag);
    let config = fast_config();
    let mut runner =
        ScenarioRunner::new(&store, &config).with_generator(RecordGenerator::seeded(7));

    let suite = runner.run_suite(&matrix(1)).await;
    assert!(suite.success(), "{}", suite);
}

#[test]
fn matrix_matches_scenario_parameters() {
    let cases = matrix(1);
    assert_eq!(cases.len(), 10);

    for kind in ScenarioKind::ALL {
        let expected = match kind {
            ScenarioKind::CreateFromTable => 2,
            ScenarioKind::ReadFromView => 4,
            ScenarioKind::UpdateViewData | ScenarioKind::DeleteViewData => 2,
        };
        assert_eq!(cases_for(kind, 1).len(), expected, "{}", kind);
    }
}

// ============================================================================
// Failure Reporting
// ============================================================================

#[tokio::test]
async fn frozen_view_reports_read_mismatch() {
    let store = MemoryStore::new();
    store.freeze_view();
    let config = fast_config();
    let mut runner =
        ScenarioRunner::new(&store, &config).with_generator(RecordGenerator::seeded(3));

    let case = ScenarioCase::new(ScenarioKind::ReadFromView, 10, 10, 1);
    let err = runner.run(&case).await.unwrap_err();

    match err {
        Error::Consistency {
            check,
            expected,
            actual,
        } => {
            assert_eq!(check, "view created: alltimehigh rows");
            assert_eq!(expected, "10 rows");
            assert!(actual.starts_with("0 rows"));
            assert!(actual.contains("10 missing"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn view_frozen_after_creation_misses_updates() {
    let store = MemoryStore::new();
    let config = fast_config();
    let mut runner =
        ScenarioRunner::new(&store, &config).with_generator(RecordGenerator::seeded(5));

    // build the view once, then stop maintaining it
    let case = ScenarioCase::new(ScenarioKind::CreateFromTable, 10, 0, 1);
    runner.run(&case).await.unwrap();
    store.freeze_view();

    let case = ScenarioCase::new(ScenarioKind::DeleteViewData, 0, 10, 1);
    let err = runner.run(&case).await.unwrap_err();
    assert!(err.is_consistency(), "unexpected error: {err}");
}

#[tokio::test]
async fn suite_report_keeps_going_after_failure() {
    let store = MemoryStore::new();
    store.freeze_view();
    let config = fast_config();
    let mut runner = ScenarioRunner::new(&store, &config);

    let suite = runner.run_suite(&matrix(1)).await;
    assert_eq!(suite.scenarios.len(), 10);
    assert!(!suite.success());

    // with no rows ever written an unmaintained view still looks right
    let passing: Vec<&str> = suite
        .scenarios
        .iter()
        .filter(|s| s.success)
        .map(|s| s.label.as_str())
        .collect();
    assert_eq!(
        passing,
        vec![
            "create_from_table[initial=0,nodes=1]",
            "read_from_view[initial=0,additional=0,nodes=1]",
        ]
    );
    for failure in suite.failures() {
        assert!(failure.error.is_some());
    }
}

#[tokio::test]
async fn nodes_parameter_is_recorded_only() {
    let store = MemoryStore::new();
    let config = fast_config();
    let mut runner = ScenarioRunner::new(&store, &config);

    let case = ScenarioCase::new(ScenarioKind::CreateFromTable, 10, 0, 3);
    let report = runner.run(&case).await.unwrap();
    assert_eq!(report.params.nodes, 3);
    assert_eq!(report.label, "create_from_table[initial=10,nodes=3]");
}

#[tokio::test]
async fn each_run_gets_a_fresh_keyspace() {
    let store = MemoryStore::new();
    let config = fast_config();
    let mut runner =
        ScenarioRunner::new(&store, &config).with_generator(RecordGenerator::seeded(9));

    let case = ScenarioCase::new(ScenarioKind::ReadFromView, 10, 10, 1);
    let first = runner.run(&case).await.unwrap();
    let second = runner.run(&case).await.unwrap();

    assert_ne!(first.keyspace, second.keyspace);
    assert!(first
        .keyspace
        .chars()
        .all(|c| c.is_ascii_lowercase()));
    assert_eq!(store.keyspaces().len(), 2);
}
