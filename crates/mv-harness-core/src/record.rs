//! Score records written to the base table and read back from the view.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Games a generated record can belong to
pub const GAMES: [&str; 2] = ["tennis", "golf"];

/// Years a generated record can fall in
pub const YEARS: [i32; 2] = [2016, 2017];

/// Length of generated user names and keyspace names
pub const IDENTIFIER_LEN: usize = 10;

/// Column tuple in `(user, game, year, month, day, score)` order
pub type ScoreRow = (String, String, i32, i32, i32, i32);

/// Primary key of the `scores` table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScoreKey {
    pub user: String,
    pub game: String,
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

/// A row of the `scores` table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub user: String,
    pub game: String,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub score: i32,
}

impl ScoreRecord {
    /// Primary key columns; the score is not part of the key.
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            user: self.user.clone(),
            game: self.game.clone(),
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }

    /// Same key with the score doubled.
    pub fn doubled(&self) -> Self {
        Self {
            score: self.score.saturating_mul(2),
            ..self.clone()
        }
    }

    /// Bind values in insert-statement order.
    pub fn to_row(&self) -> ScoreRow {
        (
            self.user.clone(),
            self.game.clone(),
            self.year,
            self.month,
            self.day,
            self.score,
        )
    }

    pub fn from_row(row: ScoreRow) -> Self {
        let (user, game, year, month, day, score) = row;
        Self {
            user,
            game,
            year,
            month,
            day,
            score,
        }
    }

    /// Rebuild a record from a key and a score.
    pub fn from_key(key: ScoreKey, score: i32) -> Self {
        Self {
            user: key.user,
            game: key.game,
            year: key.year,
            month: key.month,
            day: key.day,
            score,
        }
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}-{:02}-{:02}, {})",
            self.user, self.game, self.year, self.month, self.day, self.score
        )
    }
}

impl ScoreKey {
    /// Bind values in delete-statement order.
    pub fn to_row(&self) -> (String, String, i32, i32, i32) {
        (
            self.user.clone(),
            self.game.clone(),
            self.year,
            self.month,
            self.day,
        )
    }
}

/// Double every score, keeping keys.
pub fn doubled_scores(records: &[ScoreRecord]) -> Vec<ScoreRecord> {
    records.iter().map(ScoreRecord::doubled).collect()
}

/// Key tuples for a delete batch.
pub fn delete_keys(records: &[ScoreRecord]) -> Vec<ScoreKey> {
    records.iter().map(ScoreRecord::key).collect()
}

/// Random lowercase ASCII identifier, usable unquoted as a CQL name.
pub fn random_identifier<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Generates batches of score records.
///
/// Within a batch the score is the record's index, so a batch of `n` holds
/// scores `0..n`.
pub struct RecordGenerator {
    rng: StdRng,
}

impl Default for RecordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn keyspace_name(&mut self) -> String {
        random_identifier(&mut self.rng, IDENTIFIER_LEN)
    }

    pub fn generate(&mut self, count: usize) -> Vec<ScoreRecord> {
        (0..count)
            .map(|i| ScoreRecord {
                user: random_identifier(&mut self.rng, IDENTIFIER_LEN),
                game: GAMES.choose(&mut self.rng).copied().unwrap_or(GAMES[0]).to_string(),
                year: *YEARS.choose(&mut self.rng).unwrap_or(&YEARS[0]),
                month: self.rng.gen_range(1..=11),
                day: self.rng.gen_range(1..=29),
                score: i32::try_from(i).unwrap_or(i32::MAX),
            })
            .collect()
    }
}
