//! Score store backed by a live CQL session.

use async_trait::async_trait;
use parking_lot::RwLock;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::batch::{Batch, BatchType};
use scylla::statement::prepared::PreparedStatement;
use scylla::statement::Consistency;
use std::time::Duration;
use tracing::{debug, trace};

use super::{ScoreStore, ViewMetadata};
use crate::config::{SchemaConfig, WriteConsistency};
use crate::record::{ScoreKey, ScoreRecord, ScoreRow};
use crate::schema;
use crate::{Error, Result};

/// CQL session plus the keyspace it currently targets
pub struct CqlStore {
    session: Session,
    replication_factor: u32,
    write_consistency: Consistency,
    keyspace: RwLock<Option<String>>,
}

fn to_consistency(level: WriteConsistency) -> Consistency {
    match level {
        WriteConsistency::Any => Consistency::Any,
        WriteConsistency::One => Consistency::One,
        WriteConsistency::LocalOne => Consistency::LocalOne,
        WriteConsistency::Quorum => Consistency::Quorum,
        WriteConsistency::LocalQuorum => Consistency::LocalQuorum,
        WriteConsistency::All => Consistency::All,
    }
}

impl CqlStore {
    /// Open a fresh session against a single contact point.
    pub async fn connect(
        contact_point: &str,
        connect_timeout: Duration,
        schema: &SchemaConfig,
    ) -> Result<Self> {
        debug!("Opening CQL session to {}", contact_point);
        let session = SessionBuilder::new()
            .known_node(contact_point)
            .connection_timeout(connect_timeout)
            .build()
            .await
            .map_err(|e| Error::cql(&format!("connect to {}", contact_point), e))?;

        Ok(Self::from_session(session, schema))
    }

    pub fn from_session(session: Session, schema: &SchemaConfig) -> Self {
        Self {
            session,
            replication_factor: schema.replication_factor,
            write_consistency: to_consistency(schema.write_consistency),
            keyspace: RwLock::new(None),
        }
    }

    /// Server release version from `system.local`.
    pub async fn release_version(&self) -> Result<String> {
        let result = self
            .session
            .query_unpaged("SELECT release_version FROM system.local", ())
            .await
            .map_err(|e| Error::cql("select release_version", e))?;
        let rows = result
            .into_rows_result()
            .map_err(|e| Error::cql("select release_version", e))?;
        let (version,) = rows
            .first_row::<(String,)>()
            .map_err(|e| Error::cql("decode release_version", e))?;
        Ok(version)
    }

    /// Keyspace set by the last `use_keyspace`
    pub fn current_keyspace(&self) -> Option<String> {
        self.keyspace.read().clone()
    }

    async fn execute_ddl(&self, context: &str, cql: String) -> Result<()> {
        trace!("{}: {}", context, cql);
        self.session
            .query_unpaged(cql, ())
            .await
            .map_err(|e| Error::cql(context, e))?;
        Ok(())
    }

    async fn select_records(&self, context: &str, cql: String) -> Result<Vec<ScoreRecord>> {
        let result = self
            .session
            .query_unpaged(cql, ())
            .await
            .map_err(|e| Error::cql(context, e))?;
        let rows = result
            .into_rows_result()
            .map_err(|e| Error::cql(context, e))?;

        rows.rows::<ScoreRow>()
            .map_err(|e| Error::cql(context, e))?
            .map(|row| {
                row.map(ScoreRecord::from_row)
                    .map_err(|e| Error::cql(context, e))
            })
            .collect()
    }

    fn write_batch(&self, statement: &PreparedStatement, len: usize) -> Batch {
        let mut batch = Batch::new(BatchType::Logged);
        for _ in 0..len {
            batch.append_statement(statement.clone());
        }
        batch.set_consistency(self.write_consistency);
        batch
    }
}

#[async_trait]
impl ScoreStore for CqlStore {
    async fn create_keyspace(&self, keyspace: &str) -> Result<()> {
        let cql = schema::create_keyspace(keyspace, self.replication_factor)?;
        self.execute_ddl("create keyspace", cql).await
    }

    async fn use_keyspace(&self, keyspace: &str) -> Result<()> {
        schema::validate_keyspace_name(keyspace)?;
        self.session
            .use_keyspace(keyspace, false)
            .await
            .map_err(|e| Error::cql(&format!("use keyspace {}", keyspace), e))?;
        *self.keyspace.write() = Some(keyspace.to_string());
        Ok(())
    }

    async fn create_scores_table(&self) -> Result<()> {
        self.execute_ddl("create table", schema::create_scores_table())
            .await
    }

    async fn create_view(&self) -> Result<()> {
        self.execute_ddl("create materialized view", schema::create_view())
            .await
    }

    async fn views(&self) -> Result<Vec<ViewMetadata>> {
        let keyspace = self
            .current_keyspace()
            .ok_or_else(|| Error::NotFound("no keyspace selected".to_string()))?;

        let result = self
            .session
            .query_unpaged(schema::SELECT_VIEWS, (keyspace,))
            .await
            .map_err(|e| Error::cql("select views", e))?;
        let rows = result
            .into_rows_result()
            .map_err(|e| Error::cql("select views", e))?;

        rows.rows::<(String, String, String)>()
            .map_err(|e| Error::cql("select views", e))?
            .map(|row| {
                row.map(|(keyspace_name, view_name, base_table_name)| ViewMetadata {
                    keyspace_name,
                    view_name,
                    base_table_name,
                })
                .map_err(|e| Error::cql("decode views", e))
            })
            .collect()
    }

    async fn insert(&self, records: &[ScoreRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let prepared = self
            .session
            .prepare(schema::INSERT_SCORE)
            .await
            .map_err(|e| Error::cql("prepare insert", e))?;
        let batch = self.write_batch(&prepared, records.len());
        let values: Vec<ScoreRow> = records.iter().map(ScoreRecord::to_row).collect();

        self.session
            .batch(&batch, values)
            .await
            .map_err(|e| Error::cql("insert batch", e))?;
        debug!("Inserted {} score records", records.len());
        Ok(())
    }

    async fn delete(&self, keys: &[ScoreKey]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let prepared = self
            .session
            .prepare(schema::DELETE_SCORE)
            .await
            .map_err(|e| Error::cql("prepare delete", e))?;
        let batch = self.write_batch(&prepared, keys.len());
        let values: Vec<_> = keys.iter().map(ScoreKey::to_row).collect();

        self.session
            .batch(&batch, values)
            .await
            .map_err(|e| Error::cql("delete batch", e))?;
        debug!("Deleted {} score records", keys.len());
        Ok(())
    }

    async fn base_rows(&self) -> Result<Vec<ScoreRecord>> {
        self.select_records("select base rows", schema::select_base_rows())
            .await
    }

    async fn view_rows(&self) -> Result<Vec<ScoreRecord>> {
        self.select_records("select view rows", schema::select_view_rows())
            .await
    }
}
