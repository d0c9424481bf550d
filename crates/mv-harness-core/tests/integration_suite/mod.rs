//! Integration tests for mv-harness-core.
//!
//! Test categories:
//! - Cluster lifecycle: create, destroy and readiness against Docker
//! - Materialized views: the scenario matrix against a live node

pub mod cluster_lifecycle;
pub mod materialized_views;
