//! Database surface used by the scenarios.
//!
//! The scenarios only need a handful of operations: schema DDL, batched
//! writes, and full reads of the base table, the view and the view catalog.
//! [`CqlStore`] runs them against a live cluster; [`MemoryStore`] emulates
//! them in-process so the scenario scripts can be exercised without Docker.

mod cql;
mod memory;

pub use cql::CqlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::record::{ScoreKey, ScoreRecord};
use crate::Result;

/// A row of `system_schema.views`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMetadata {
    pub keyspace_name: String,
    pub view_name: String,
    pub base_table_name: String,
}

/// Trait for score stores
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Create a SimpleStrategy keyspace if it does not exist
    async fn create_keyspace(&self, keyspace: &str) -> Result<()>;

    /// Make a keyspace the target of unqualified statements
    async fn use_keyspace(&self, keyspace: &str) -> Result<()>;

    /// Create the `scores` base table in the current keyspace
    async fn create_scores_table(&self) -> Result<()>;

    /// Create the `alltimehigh` materialized view over `scores`
    async fn create_view(&self) -> Result<()>;

    /// Views defined in the current keyspace
    async fn views(&self) -> Result<Vec<ViewMetadata>>;

    /// Insert (or overwrite by key) records in one batch
    async fn insert(&self, records: &[ScoreRecord]) -> Result<()>;

    /// Delete records by primary key in one batch
    async fn delete(&self, keys: &[ScoreKey]) -> Result<()>;

    /// All rows of the base table
    async fn base_rows(&self) -> Result<Vec<ScoreRecord>>;

    /// All rows of the view
    async fn view_rows(&self) -> Result<Vec<ScoreRecord>>;
}
