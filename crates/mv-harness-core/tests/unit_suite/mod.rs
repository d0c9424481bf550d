//! Unit tests for mv-harness-core.
//!
//! Scenarios run against `MemoryStore`; the cluster manager runs against a
//! recording container runtime.

pub mod cluster;
pub mod config;
pub mod helpers;
pub mod scenarios;
