//! Polling with bounded exponential backoff.
//!
//! Used for two kinds of waiting:
//! - cluster readiness (until a CQL session can be opened)
//! - view settling (until the view reflects the base table after a write)
//!
//! Every wait has an explicit deadline. When it passes, the caller gets a
//! typed [`Error::NotReady`] carrying the attempt count and the last reason
//! the probe gave for not being ready.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::{Error, Result};

/// Backoff and deadline settings for a polling loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay after the first failed attempt in milliseconds
    pub initial_delay_ms: u64,

    /// Upper bound for a single delay in milliseconds
    pub max_delay_ms: u64,

    /// Overall deadline in seconds
    pub timeout_secs: u64,
}

impl RetryPolicy {
    /// Overall deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay_ms = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }

    /// Validate the policy, naming the config section in errors.
    pub fn validate(&self, section: &str) -> Result<()> {
        if self.initial_delay_ms == 0 {
            return Err(Error::Config(format!(
                "{}.initial_delay_ms must be > 0",
                section
            )));
        }

        if self.max_delay_ms < self.initial_delay_ms {
            return Err(Error::Config(format!(
                "{}.max_delay_ms ({}) < initial_delay_ms ({})",
                section, self.max_delay_ms, self.initial_delay_ms
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config(format!(
                "{}.timeout_secs must be > 0",
                section
            )));
        }

        Ok(())
    }
}

/// Outcome of a single readiness probe
#[derive(Debug)]
pub enum Probe<T> {
    /// The condition holds; polling stops with this value
    Ready(T),
    /// Not yet; the reason is kept for the final error
    Pending(String),
}

impl<T> Probe<T> {
    /// Treat any error as "not ready yet".
    pub fn from_result<E: std::fmt::Display>(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Probe::Ready(value),
            Err(e) => Probe::Pending(e.to_string()),
        }
    }
}

/// Poll `probe` until it reports ready or the policy deadline passes.
///
/// A probe still running at the deadline is cancelled. The probe receives the
/// 1-based attempt number.
pub async fn wait_for<T, F, Fut>(target: &str, policy: &RetryPolicy, mut probe: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Probe<T>>,
{
    let start = Instant::now();
    let deadline = start + policy.timeout();
    let mut attempt: u32 = 0;
    let mut last_error = String::from("no attempt completed");

    loop {
        attempt += 1;

        match tokio::time::timeout_at(deadline, probe(attempt)).await {
            Ok(Probe::Ready(value)) => {
                debug!(
                    "{} ready after {} attempt(s) in {:?}",
                    target,
                    attempt,
                    start.elapsed()
                );
                return Ok(value);
            }
            Ok(Probe::Pending(reason)) => {
                debug!("{} not ready (attempt {}): {}", target, attempt, reason);
                last_error = reason;
            }
            Err(_) => {
                last_error = format!("attempt {} still running at deadline", attempt);
                break;
            }
        }

        let now = Instant::now();
        if now >= deadline {
            break;
        }

        let delay = policy.delay_for_attempt(attempt).min(deadline - now);
        tokio::time::sleep(delay).await;
    }

    Err(Error::NotReady {
        target: target.to_string(),
        attempts: attempt,
        elapsed: start.elapsed(),
        last_error,
    })
}
