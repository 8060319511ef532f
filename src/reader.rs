//! Record source interface
//!
//! The engine never talks to a health store directly; platform bindings
//! (or test doubles) implement [`HealthRecordReader`] and are injected
//! into the exporter at construction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::distances::DistanceSeries;
use crate::error::Result;
use crate::types::{ActivitySummary, Workout};

/// Source of raw health records for a date range.
///
/// Implementations may return an empty set but must not silently truncate
/// a non-empty one. The orchestrator treats a failed fetch the same as an
/// empty fetch ("no data"); the source cannot distinguish the two for it.
#[async_trait]
pub trait HealthRecordReader: Send + Sync {
    /// Fetch workouts in `[start, end]`; `None` bounds mean full history
    async fn fetch_workouts(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Workout>>;

    /// Fetch daily activity summaries for `[start, end]`
    async fn fetch_activity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivitySummary>>;

    /// Fetch sparse per-day distance series for `[start, end]`.
    ///
    /// The engine expands the series into one entry per calendar day (see
    /// [`crate::distances::day_entries`]); sources only report the days
    /// they have measurements for.
    async fn fetch_distance_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DistanceSeries>;
}
