//! In-memory score store for testing.
//!
//! Emulates the parts of a cluster the scenarios touch: keyspaces, the
//! `scores` table, and an `alltimehigh` view that is refreshed from the base
//! table lazily. The view can be told to lag a number of reads behind every
//! write, or be frozen entirely, to exercise the settle and mismatch paths.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{ScoreStore, ViewMetadata};
use crate::record::{ScoreKey, ScoreRecord};
use crate::schema::{self, BASE_TABLE, VIEW_NAME};
use crate::{Error, Result};

type Rows = BTreeMap<ScoreKey, i32>;

#[derive(Default)]
struct MemoryState {
    keyspaces: HashMap<String, KeyspaceState>,
    current: Option<String>,
}

#[derive(Default)]
struct KeyspaceState {
    table: Option<Rows>,
    view: Option<ViewState>,
}

struct ViewState {
    rows: Rows,
    stale_reads: u32,
}

/// In-memory store
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    view_lag: u32,
    frozen: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a store whose view is always current
    pub fn new() -> Self {
        Self::with_view_lag(0)
    }

    /// Create a store whose view serves `reads` stale reads after each change
    pub fn with_view_lag(reads: u32) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            view_lag: reads,
            frozen: AtomicBool::new(false),
        }
    }

    /// Stop refreshing the view until [`MemoryStore::thaw_view`]
    pub fn freeze_view(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    pub fn thaw_view(&self) {
        self.frozen.store(false, Ordering::SeqCst);
    }

    /// Keyspaces created so far
    pub fn keyspaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().keyspaces.keys().cloned().collect();
        names.sort();
        names
    }

    fn with_keyspace<T>(&self, f: impl FnOnce(&mut KeyspaceState) -> Result<T>) -> Result<T> {
        let mut state = self.state.write();
        let current = state
            .current
            .clone()
            .ok_or_else(|| Error::NotFound("no keyspace selected".to_string()))?;
        let keyspace = state
            .keyspaces
            .get_mut(&current)
            .ok_or_else(|| Error::NotFound(format!("keyspace {}", current)))?;
        f(keyspace)
    }

    fn mark_view_stale(&self, keyspace: &mut KeyspaceState) {
        if let Some(view) = keyspace.view.as_mut() {
            view.stale_reads = self.view_lag;
        }
    }
}

fn table_mut(keyspace: &mut KeyspaceState) -> Result<&mut Rows> {
    keyspace
        .table
        .as_mut()
        .ok_or_else(|| Error::NotFound(format!("table {}", BASE_TABLE)))
}

fn to_records(rows: &Rows) -> Vec<ScoreRecord> {
    rows.iter()
        .map(|(key, score)| ScoreRecord::from_key(key.clone(), *score))
        .collect()
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn create_keyspace(&self, keyspace: &str) -> Result<()> {
        schema::validate_keyspace_name(keyspace)?;
        self.state
            .write()
            .keyspaces
            .entry(keyspace.to_string())
            .or_default();
        Ok(())
    }

    async fn use_keyspace(&self, keyspace: &str) -> Result<()> {
        let mut state = self.state.write();
        if !state.keyspaces.contains_key(keyspace) {
            return Err(Error::NotFound(format!("keyspace {}", keyspace)));
        }
        state.current = Some(keyspace.to_string());
        Ok(())
    }

    async fn create_scores_table(&self) -> Result<()> {
        self.with_keyspace(|keyspace| {
            if keyspace.table.is_some() {
                return Err(Error::Cql(format!("table {} already exists", BASE_TABLE)));
            }
            keyspace.table = Some(Rows::new());
            Ok(())
        })
    }

    async fn create_view(&self) -> Result<()> {
        let lag = self.view_lag;
        self.with_keyspace(|keyspace| {
            if keyspace.table.is_none() {
                return Err(Error::NotFound(format!("table {}", BASE_TABLE)));
            }
            if keyspace.view.is_some() {
                return Err(Error::Cql(format!("view {} already exists", VIEW_NAME)));
            }
            // the initial build counts as a pending change
            keyspace.view = Some(ViewState {
                rows: Rows::new(),
                stale_reads: lag,
            });
            Ok(())
        })
    }

    async fn views(&self) -> Result<Vec<ViewMetadata>> {
        let state = self.state.read();
        let current = state
            .current
            .as_ref()
            .ok_or_else(|| Error::NotFound("no keyspace selected".to_string()))?;

        Ok(state
            .keyspaces
            .get(current)
            .and_then(|keyspace| keyspace.view.as_ref())
            .map(|_| ViewMetadata {
                keyspace_name: current.clone(),
                view_name: VIEW_NAME.to_string(),
                base_table_name: BASE_TABLE.to_string(),
            })
            .into_iter()
            .collect())
    }

    async fn insert(&self, records: &[ScoreRecord]) -> Result<()> {
        self.with_keyspace(|keyspace| {
            let table = table_mut(keyspace)?;
            for record in records {
                table.insert(record.key(), record.score);
            }
            self.mark_view_stale(keyspace);
            Ok(())
        })
    }

    async fn delete(&self, keys: &[ScoreKey]) -> Result<()> {
        self.with_keyspace(|keyspace| {
            let table = table_mut(keyspace)?;
            for key in keys {
                table.remove(key);
            }
            self.mark_view_stale(keyspace);
            Ok(())
        })
    }

    async fn base_rows(&self) -> Result<Vec<ScoreRecord>> {
        self.with_keyspace(|keyspace| Ok(to_records(table_mut(keyspace)?)))
    }

    async fn view_rows(&self) -> Result<Vec<ScoreRecord>> {
        let frozen = self.frozen.load(Ordering::SeqCst);
        self.with_keyspace(|keyspace| {
            let base = keyspace.table.clone().unwrap_or_default();
            let view = keyspace
                .view
                .as_mut()
                .ok_or_else(|| Error::NotFound(format!("view {}", VIEW_NAME)))?;

            if !frozen {
                if view.stale_reads > 0 {
                    view.stale_reads -= 1;
                } else {
                    view.rows = base;
                }
            }

            // served in view clustering order: game, then score descending
            let mut records = to_records(&view.rows);
            records.sort_by(|a, b| {
                a.game
                    .cmp(&b.game)
                    .then(b.score.cmp(&a.score))
                    .then(a.key().cmp(&b.key()))
            });
            Ok(records)
        })
    }
}
