//! Scenario and suite reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ScenarioKind, ScenarioParams};

/// Outcome of a single scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario that ran
    pub scenario: ScenarioKind,

    /// Case label, e.g. `read_from_view[initial=10,additional=0,nodes=1]`
    pub label: String,

    pub params: ScenarioParams,

    /// Keyspace created for this run
    pub keyspace: String,

    pub start_time: DateTime<Utc>,

    /// Duration in milliseconds
    pub duration_ms: u64,

    /// Checks that passed before the run ended
    pub checks_passed: u32,

    /// Whether every check passed
    pub success: bool,

    /// First failure, if any
    pub error: Option<String>,
}

/// Outcome of a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub start_time: DateTime<Utc>,

    /// Total duration in milliseconds
    pub duration_ms: u64,

    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.success).count()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    /// True when every scenario passed
    pub fn success(&self) -> bool {
        self.scenarios.iter().all(|s| s.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(|s| !s.success)
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "PASS" } else { "FAIL" };
        write!(
            f,
            "{} {} ({} checks, {} ms, keyspace {})",
            status, self.label, self.checks_passed, self.duration_ms, self.keyspace
        )?;
        if let Some(error) = &self.error {
            write!(f, "\n     {}", error)?;
        }
        Ok(())
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scenario in &self.scenarios {
            writeln!(f, "{}", scenario)?;
        }
        write!(
            f,
            "{} passed, {} failed in {:.1}s",
            self.passed(),
            self.failed(),
            self.duration_ms as f64 / 1000.0
        )
    }
}
