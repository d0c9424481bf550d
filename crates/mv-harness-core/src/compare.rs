//! Order-independent comparison of base-table and view result sets.
//!
//! Both sides are sorted by score and then by primary key, which is a total
//! order over records, and the sorted sequences are compared element-wise.

use std::cmp::Ordering;

use crate::record::ScoreRecord;
use crate::{Error, Result};

/// Records shown in a mismatch message per side
const SUMMARY_LIMIT: usize = 3;

/// Total order: score ascending, then primary key.
pub fn score_order(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    a.score
        .cmp(&b.score)
        .then_with(|| a.user.cmp(&b.user))
        .then_with(|| a.game.cmp(&b.game))
        .then_with(|| (a.year, a.month, a.day).cmp(&(b.year, b.month, b.day)))
}

pub fn sorted_by_score(records: &[ScoreRecord]) -> Vec<ScoreRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(score_order);
    sorted
}

/// Multiset difference between an expected and an observed result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSetDiff {
    /// Expected but not observed
    pub missing: Vec<ScoreRecord>,
    /// Observed but not expected
    pub unexpected: Vec<ScoreRecord>,
}

impl RowSetDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// Short human-readable description of the first few differences
    pub fn summary(&self) -> String {
        fn head(records: &[ScoreRecord]) -> String {
            let mut shown: Vec<String> = records
                .iter()
                .take(SUMMARY_LIMIT)
                .map(|r| r.to_string())
                .collect();
            if records.len() > SUMMARY_LIMIT {
                shown.push(format!("... {} more", records.len() - SUMMARY_LIMIT));
            }
            shown.join(", ")
        }

        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!(
                "{} missing [{}]",
                self.missing.len(),
                head(&self.missing)
            ));
        }
        if !self.unexpected.is_empty() {
            parts.push(format!(
                "{} unexpected [{}]",
                self.unexpected.len(),
                head(&self.unexpected)
            ));
        }
        parts.join("; ")
    }
}

/// Compute what `actual` lacks and what it has in excess of `expected`.
pub fn diff_rows(expected: &[ScoreRecord], actual: &[ScoreRecord]) -> RowSetDiff {
    let expected = sorted_by_score(expected);
    let actual = sorted_by_score(actual);

    let mut diff = RowSetDiff::default();
    let (mut i, mut j) = (0, 0);
    while i < expected.len() && j < actual.len() {
        match score_order(&expected[i], &actual[j]) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                diff.missing.push(expected[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                diff.unexpected.push(actual[j].clone());
                j += 1;
            }
        }
    }
    diff.missing.extend_from_slice(&expected[i..]);
    diff.unexpected.extend_from_slice(&actual[j..]);
    diff
}

/// Whether both sides hold the same records, ignoring order.
pub fn same_rows(expected: &[ScoreRecord], actual: &[ScoreRecord]) -> bool {
    expected.len() == actual.len() && sorted_by_score(expected) == sorted_by_score(actual)
}

pub fn assert_row_count(check: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::consistency(
            check,
            format!("{} rows", expected),
            format!("{} rows", actual),
        ));
    }
    Ok(())
}

pub fn assert_same_rows(check: &str, expected: &[ScoreRecord], actual: &[ScoreRecord]) -> Result<()> {
    if same_rows(expected, actual) {
        return Ok(());
    }

    let diff = diff_rows(expected, actual);
    Err(Error::consistency(
        check,
        format!("{} rows", expected.len()),
        format!("{} rows ({})", actual.len(), diff.summary()),
    ))
}
