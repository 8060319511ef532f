//! Error types for pulselog
//!
//! The taxonomy follows the failure policy of the export engine:
//! - transport/remote errors are non-fatal per file and surfaced as
//!   [`RemoteError`] so the orchestrator can log and continue,
//! - precondition failures ([`Error::NotReady`]) are fatal to starting a run,
//! - data errors never become errors at all — renderers substitute
//!   documented defaults instead.

use thiserror::Error;

/// Result type alias for pulselog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pulselog
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g. "remote.owner")
        key: Option<String>,
    },

    /// Export preconditions not met (no credentials or no repository configured)
    #[error("export not ready: {0}")]
    NotReady(String),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Remote content store error
    #[error("remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An export run is already in progress
    #[error("an export run is already in progress")]
    RunInProgress,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Remote content store errors
///
/// A write is two coupled remote calls (read version, then conditional
/// write); a failure in either call surfaces here and aborts that file's
/// write only.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote returned a non-success HTTP status
    #[error("remote returned status {status} for {path}")]
    Http {
        /// HTTP status code returned by the remote
        status: u16,
        /// Remote path the request addressed
        path: String,
    },

    /// The remote response was missing an expected field or unparseable
    #[error("invalid remote response for {path}: {reason}")]
    InvalidResponse {
        /// Remote path the request addressed
        path: String,
        /// What was wrong with the response
        reason: String,
    },

    /// The repository could not be resolved or created
    #[error("failed to resolve repository: {0}")]
    Repository(String),

    /// Credentials are missing or incomplete
    #[error("missing credentials: {0}")]
    Credentials(String),
}
