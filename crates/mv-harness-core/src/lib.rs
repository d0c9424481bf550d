//! Materialized View Harness Core Library
//!
//! This crate provisions a single-node Cassandra container, drives scripted
//! writes against a `scores` table and checks that the `alltimehigh`
//! materialized view keeps up with it.

pub mod cluster;
pub mod compare;
pub mod config;
pub mod error;
pub mod readiness;
pub mod record;
pub mod scenario;
pub mod schema;
pub mod store;

pub use cluster::{
    ClusterHandle, ClusterManager, ContainerRuntime, CqlProbe, DockerApi, EndpointProbe,
};
pub use config::{ClusterConfig, HarnessConfig, ScenarioOptions, SchemaConfig, WriteConsistency};
pub use error::{ContainerError, Error, Result};
pub use readiness::{wait_for, Probe, RetryPolicy};
pub use record::{RecordGenerator, ScoreKey, ScoreRecord};
pub use scenario::{
    matrix, ScenarioCase, ScenarioKind, ScenarioParams, ScenarioReport, ScenarioRunner,
    SuiteReport,
};
pub use store::{CqlStore, MemoryStore, ScoreStore, ViewMetadata};
