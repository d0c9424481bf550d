//! CQL statements for the scores table and its materialized view.

use crate::{Error, Result};

/// Base table name
pub const BASE_TABLE: &str = "scores";

/// Materialized view name
pub const VIEW_NAME: &str = "alltimehigh";

/// Select list shared by base-table and view reads so both decode the same way.
pub const SCORE_COLUMNS: &str = "user, game, year, month, day, score";

pub const INSERT_SCORE: &str =
    "INSERT INTO scores (user, game, year, month, day, score) VALUES (?, ?, ?, ?, ?, ?)";

pub const DELETE_SCORE: &str =
    "DELETE FROM scores WHERE user = ? AND game = ? AND year = ? AND month = ? AND day = ?";

/// Leading columns of `system_schema.views`, minus `base_table_id`.
pub const SELECT_VIEWS: &str = "SELECT keyspace_name, view_name, base_table_name \
     FROM system_schema.views WHERE keyspace_name = ?";

/// Check that a keyspace name can be used unquoted.
pub fn validate_keyspace_name(keyspace: &str) -> Result<()> {
    let mut chars = keyspace.chars();
    let starts_ok = chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
    let rest_ok = keyspace
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !starts_ok || !rest_ok || keyspace.len() > 48 {
        return Err(Error::Config(format!("invalid keyspace name '{}'", keyspace)));
    }
    Ok(())
}

pub fn create_keyspace(keyspace: &str, replication_factor: u32) -> Result<String> {
    validate_keyspace_name(keyspace)?;
    Ok(format!(
        "CREATE KEYSPACE IF NOT EXISTS {} \
         WITH replication = {{ 'class': 'SimpleStrategy', 'replication_factor': '{}' }}",
        keyspace, replication_factor
    ))
}

pub fn create_scores_table() -> String {
    format!(
        "CREATE TABLE {} (\
         user TEXT, \
         game TEXT, \
         year INT, \
         month INT, \
         day INT, \
         score INT, \
         PRIMARY KEY (user, game, year, month, day))",
        BASE_TABLE
    )
}

pub fn create_view() -> String {
    format!(
        "CREATE MATERIALIZED VIEW {} AS \
         SELECT user FROM {} \
         WHERE game IS NOT NULL AND score IS NOT NULL AND user IS NOT NULL \
         AND year IS NOT NULL AND month IS NOT NULL AND day IS NOT NULL \
         PRIMARY KEY (game, score, user, year, month, day) \
         WITH CLUSTERING ORDER BY (score DESC)",
        VIEW_NAME, BASE_TABLE
    )
}

pub fn select_base_rows() -> String {
    format!("SELECT {} FROM {}", SCORE_COLUMNS, BASE_TABLE)
}

pub fn select_view_rows() -> String {
    format!("SELECT {} FROM {}", SCORE_COLUMNS, VIEW_NAME)
}
