//! Configuration structures for cluster provisioning and scenario runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::readiness::RetryPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Container and endpoint configuration
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Backoff used while waiting for the database to accept sessions
    #[serde(default = "default_readiness_policy")]
    pub readiness: RetryPolicy,

    /// Backoff used while waiting for the view to catch up after writes
    #[serde(default = "default_settle_policy")]
    pub settle: RetryPolicy,

    /// Keyspace and write options
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Scenario execution options
    #[serde(default)]
    pub scenarios: ScenarioOptions,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            readiness: default_readiness_policy(),
            settle: default_settle_policy(),
            schema: SchemaConfig::default(),
            scenarios: ScenarioOptions::default(),
        }
    }
}

/// Database container configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Image tag to run; destroy removes every container of this image
    #[serde(default = "default_image")]
    pub image: String,

    /// CQL contact point as host:port
    #[serde(default = "default_contact_point")]
    pub contact_point: String,

    /// Container network mode (default: host)
    #[serde(default = "default_network_mode")]
    pub network_mode: String,

    /// Extra environment variables passed to the container
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Arguments appended after the image name
    #[serde(default)]
    pub args: Vec<String>,

    /// Per-attempt CQL connection timeout in milliseconds (default: 5000)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            contact_point: default_contact_point(),
            network_mode: default_network_mode(),
            env: BTreeMap::new(),
            args: Vec::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ClusterConfig {
    /// Per-attempt connection timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_image() -> String {
    "cassandra:latest".to_string()
}

fn default_contact_point() -> String {
    "127.0.0.1:9042".to_string()
}

fn default_network_mode() -> String {
    "host".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_readiness_policy() -> RetryPolicy {
    RetryPolicy {
        initial_delay_ms: 500,
        max_delay_ms: 5_000,
        timeout_secs: 180,
    }
}

fn default_settle_policy() -> RetryPolicy {
    RetryPolicy {
        initial_delay_ms: 100,
        max_delay_ms: 1_000,
        timeout_secs: 10,
    }
}

/// Keyspace and write options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// SimpleStrategy replication factor (default: 1)
    #[serde(default = "default_replication_factor")]
    pub replication_factor: u32,

    /// Consistency level for batched writes (default: any)
    #[serde(default)]
    pub write_consistency: WriteConsistency,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            replication_factor: default_replication_factor(),
            write_consistency: WriteConsistency::default(),
        }
    }
}

fn default_replication_factor() -> u32 {
    1
}

/// Consistency level requested for write batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteConsistency {
    #[default]
    Any,
    One,
    LocalOne,
    Quorum,
    LocalQuorum,
    All,
}

/// Scenario execution options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOptions {
    /// Upper bound for a single scenario run in seconds (default: 60)
    #[serde(default = "default_scenario_timeout_secs")]
    pub timeout_secs: u64,

    /// Node count recorded with each scenario (accepted, not acted on)
    #[serde(default = "default_nodes")]
    pub nodes: u32,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            timeout_secs: default_scenario_timeout_secs(),
            nodes: default_nodes(),
        }
    }
}

impl ScenarioOptions {
    /// Scenario deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_scenario_timeout_secs() -> u64 {
    60
}

fn default_nodes() -> u32 {
    1
}

impl HarnessConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: HarnessConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.cluster.image.trim().is_empty() {
            return Err(crate::Error::Config(
                "cluster.image must not be empty".to_string(),
            ));
        }

        if self.cluster.network_mode.trim().is_empty() {
            return Err(crate::Error::Config(
                "cluster.network_mode must not be empty".to_string(),
            ));
        }

        parse_contact_point(&self.cluster.contact_point)?;

        if self.cluster.connect_timeout_ms == 0 {
            return Err(crate::Error::Config(
                "cluster.connect_timeout_ms must be > 0".to_string(),
            ));
        }

        self.readiness.validate("readiness")?;
        self.settle.validate("settle")?;

        if self.schema.replication_factor == 0 {
            return Err(crate::Error::Config(
                "schema.replication_factor must be > 0".to_string(),
            ));
        }

        if self.scenarios.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "scenarios.timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Split a `host:port` contact point, rejecting missing or invalid ports.
pub fn parse_contact_point(contact_point: &str) -> crate::Result<(String, u16)> {
    let (host, port) = contact_point.rsplit_once(':').ok_or_else(|| {
        crate::Error::Config(format!(
            "contact point '{}' must be host:port",
            contact_point
        ))
    })?;

    if host.is_empty() {
        return Err(crate::Error::Config(format!(
            "contact point '{}' has an empty host",
            contact_point
        )));
    }

    let port = port.parse::<u16>().map_err(|_| {
        crate::Error::Config(format!(
            "contact point '{}' has an invalid port",
            contact_point
        ))
    })?;

    Ok((host.to_string(), port))
}
