//! Database layer for pulselog
//!
//! Handles SQLite persistence for sync-state markers. The database is the
//! only persisted entity in the engine; year buckets and samples are
//! transient per run.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`state`] — Sync-state key/value accessors

use sqlx::sqlite::SqlitePool;

mod migrations;
mod state;

pub use state::keys;

/// Database handle for pulselog
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
