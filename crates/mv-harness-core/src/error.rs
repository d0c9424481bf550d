//! Error types for the materialized-view harness.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness library.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Container runtime error
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// CQL driver or query error
    #[error("CQL error: {0}")]
    Cql(String),

    /// A dependency did not become ready before its deadline
    #[error("{target} not ready after {attempts} attempts ({elapsed:?}): {last_error}")]
    NotReady {
        target: String,
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },

    /// A scenario check observed a state different from the expected one
    #[error("Check '{check}' failed: expected {expected}, got {actual}")]
    Consistency {
        check: String,
        expected: String,
        actual: String,
    },

    /// Operation exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Schema object or keyspace missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Container runtime errors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ContainerError {
    /// No client could be built for the container daemon
    #[error("Failed to connect to container daemon: {0}")]
    Connect(String),

    /// The daemon rejected or failed a request
    #[error("Failed to {operation}: {message}")]
    Api { operation: String, message: String },
}

impl ContainerError {
    /// Build an API error carrying the operation that failed.
    pub fn api(operation: &str, err: impl std::fmt::Display) -> Self {
        ContainerError::Api {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Build a CQL error carrying the operation that failed.
    pub fn cql(context: &str, err: impl std::fmt::Display) -> Self {
        Error::Cql(format!("{}: {}", context, err))
    }

    /// Build a consistency error from any displayable expected/actual pair.
    pub fn consistency(
        check: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Error::Consistency {
            check: check.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Whether this error came from a failed scenario check.
    pub fn is_consistency(&self) -> bool {
        matches!(self, Error::Consistency { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
