//! Sync-state key/value accessors.
//!
//! Freshness markers and the setup flag live in a single `sync_state`
//! table. Values are opaque strings; interpretation (timestamps, dates,
//! booleans) belongs to the freshness tracker.

use crate::error::DatabaseError;
use crate::{Error, Result};

use super::Database;

/// Well-known sync-state keys
pub mod keys {
    /// End timestamp of the newest workout included in the last sync
    pub const LAST_WORKOUT: &str = "last_workout";
    /// Last day covered by an activity or distance sync (`YYYY-MM-DD`)
    pub const LAST_ACTIVITY_SYNC_DATE: &str = "last_activity_sync_date";
    /// When the last sync completed (RFC 3339)
    pub const LAST_SYNC_DATE: &str = "last_sync_date";
    /// Whether first-time setup (including the README write) has finished
    pub const SETUP_FINISHED: &str = "setup_finished";
}

impl Database {
    /// Read a sync-state value
    pub async fn get_state(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM sync_state WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to read sync state '{}': {}",
                        key, e
                    )))
                })?;

        Ok(value)
    }

    /// Write a sync-state value, replacing any previous one
    pub async fn set_state(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO sync_state (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to write sync state '{}': {}",
                key, e
            )))
        })?;

        Ok(())
    }

    /// Remove a sync-state value, if present
    pub async fn clear_state(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM sync_state WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to clear sync state '{}': {}",
                    key, e
                )))
            })?;

        Ok(())
    }
}
