//! Configuration file tests.

use std::io::Write;
use std::path::PathBuf;

use mv_harness_core::{Error, HarnessConfig, WriteConsistency};

fn example_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/example.yaml")
}

#[test]
fn example_config_loads() {
    let config = HarnessConfig::from_file(example_config_path()).unwrap();

    assert_eq!(config.cluster.image, "cassandra:3.11");
    assert_eq!(config.cluster.network_mode, "host");
    assert_eq!(config.cluster.env.len(), 2);
    assert!(config.cluster.args.is_empty());
    assert_eq!(config.schema.write_consistency, WriteConsistency::Any);
    assert_eq!(config.readiness.timeout_secs, 180);
    assert_eq!(config.scenarios.nodes, 1);
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "settle:\n  initial_delay_ms: 500\n  max_delay_ms: 100\n  timeout_secs: 5"
    )
    .unwrap();

    let err = HarnessConfig::from_file(file.path()).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("settle.max_delay_ms")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_consistency_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "schema:\n  write_consistency: serial").unwrap();

    let err = HarnessConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[test]
fn missing_file_is_a_config_error_naming_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = HarnessConfig::from_file(&path).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("absent.yaml"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}
