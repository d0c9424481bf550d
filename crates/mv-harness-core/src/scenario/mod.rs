//! Materialized-view scenarios.
//!
//! Every scenario follows the same shape:
//!
//! 1. create an isolated keyspace with an empty `scores` table
//! 2. insert an initial batch and check the base table and view catalog
//! 3. create the `alltimehigh` view and let it settle
//! 4. mutate the base table and check the view reflects it
//!
//! Scenarios are parametrized by batch sizes. [`matrix`] expands every
//! scenario into the cases the suite runs.

mod report;
mod runner;
mod script;

pub use report::{ScenarioReport, SuiteReport};
pub use runner::ScenarioRunner;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

const EMPTY_OR_TEN: &[usize] = &[0, 10];
const TEN: &[usize] = &[10];

/// The scripted scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// View built over a table that already holds data
    CreateFromTable,
    /// View contents after creation and after more inserts
    ReadFromView,
    /// Same-key inserts with doubled scores propagate to the view
    UpdateViewData,
    /// Deleting every row empties the view
    DeleteViewData,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::CreateFromTable,
        ScenarioKind::ReadFromView,
        ScenarioKind::UpdateViewData,
        ScenarioKind::DeleteViewData,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::CreateFromTable => "create_from_table",
            ScenarioKind::ReadFromView => "read_from_view",
            ScenarioKind::UpdateViewData => "update_view_data",
            ScenarioKind::DeleteViewData => "delete_view_data",
        }
    }

    /// Initial batch sizes the scenario runs with
    pub fn initial_sizes(&self) -> &'static [usize] {
        EMPTY_OR_TEN
    }

    /// Additional batch sizes; `None` when the scenario writes only one batch
    pub fn additional_sizes(&self) -> Option<&'static [usize]> {
        match self {
            ScenarioKind::CreateFromTable => None,
            ScenarioKind::ReadFromView => Some(EMPTY_OR_TEN),
            ScenarioKind::UpdateViewData | ScenarioKind::DeleteViewData => Some(TEN),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ScenarioKind::ALL.iter().map(|k| k.name()).collect();
                Error::Config(format!(
                    "unknown scenario '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Batch sizes and cluster shape for one scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub initial_size: usize,
    pub additional_size: usize,
    /// Recorded with the run; the cluster is always a single node
    pub nodes: u32,
}

/// A scenario together with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCase {
    pub kind: ScenarioKind,
    pub params: ScenarioParams,
}

impl ScenarioCase {
    pub fn new(kind: ScenarioKind, initial_size: usize, additional_size: usize, nodes: u32) -> Self {
        Self {
            kind,
            params: ScenarioParams {
                initial_size,
                additional_size,
                nodes,
            },
        }
    }
}

impl fmt::Display for ScenarioCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[initial={}", self.kind, self.params.initial_size)?;
        if self.kind.additional_sizes().is_some() {
            write!(f, ",additional={}", self.params.additional_size)?;
        }
        write!(f, ",nodes={}]", self.params.nodes)
    }
}

/// Every case of one scenario.
pub fn cases_for(kind: ScenarioKind, nodes: u32) -> Vec<ScenarioCase> {
    let additional = kind.additional_sizes().unwrap_or(&[0]);
    kind.initial_sizes()
        .iter()
        .flat_map(|&initial| {
            additional
                .iter()
                .map(move |&extra| ScenarioCase::new(kind, initial, extra, nodes))
        })
        .collect()
}

/// Every case of every scenario, in suite order.
pub fn matrix(nodes: u32) -> Vec<ScenarioCase> {
    ScenarioKind::ALL
        .into_iter()
        .flat_map(|kind| cases_for(kind, nodes))
        .collect()
}
