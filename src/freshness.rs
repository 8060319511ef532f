//! Freshness tracking for export stages
//!
//! Each record kind keeps a persisted marker describing how far the last
//! successful sync reached. A sync is worthwhile only when newly observed
//! data lies beyond that marker. Checks are conservative: with no marker
//! stored (first run, or after a reset) data always counts as fresh.
//!
//! Marking is asymmetric by design, preserved from long-standing observed
//! behavior: the activity and distance markers also advance the shared
//! "last sync completed" timestamp, while the workout marker does not.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};

use crate::db::{Database, keys};
use crate::error::Result;
use crate::types::{DistanceDayEntry, Workout};

/// Decides whether new data justifies a sync and records sync progress
#[derive(Clone)]
pub struct FreshnessTracker {
    db: Arc<Database>,
}

impl FreshnessTracker {
    /// Create a tracker over the given state database
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Whether the given workouts contain anything newer than the last
    /// synced workout.
    ///
    /// With no marker stored (first run) every set counts as fresh. Once a
    /// marker exists, an empty set is never fresh and a non-empty one is
    /// fresh only if its newest end timestamp lies beyond the marker; an
    /// unparseable marker falls back to fresh.
    pub async fn fresh_workouts_available(&self, workouts: &[Workout]) -> Result<bool> {
        let marker = self.db.get_state(keys::LAST_WORKOUT).await?;
        let Some(marker) = marker else {
            return Ok(true);
        };

        let Some(newest) = newest_workout_end(workouts) else {
            return Ok(false);
        };

        match DateTime::parse_from_rfc3339(&marker) {
            Ok(last) => Ok(newest > last.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!(marker = %marker, error = %e, "Unparseable workout marker, treating data as fresh");
                Ok(true)
            }
        }
    }

    /// Record the newest workout end timestamp as synced.
    ///
    /// Does not touch the shared last-sync timestamp; only the activity
    /// and distance paths advance it.
    pub async fn mark_last_workout(&self, workouts: &[Workout]) -> Result<()> {
        if let Some(newest) = newest_workout_end(workouts) {
            // Full precision: the marker must compare equal to the same
            // workout set on the next freshness check
            self.db
                .set_state(keys::LAST_WORKOUT, &newest.to_rfc3339())
                .await?;
        }
        Ok(())
    }

    /// Whether activity data through yesterday still needs a sync.
    ///
    /// True when no marker is stored or the stored day lies before
    /// yesterday; false once yesterday (or anything later) was synced.
    pub async fn fresh_activity_available(&self, today: NaiveDate) -> Result<bool> {
        let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
            return Ok(true);
        };

        let marker = self.db.get_state(keys::LAST_ACTIVITY_SYNC_DATE).await?;
        let Some(marker) = marker else {
            return Ok(true);
        };

        match marker.parse::<NaiveDate>() {
            Ok(last) => Ok(last < yesterday),
            Err(e) => {
                tracing::warn!(marker = %marker, error = %e, "Unparseable activity marker, treating data as fresh");
                Ok(true)
            }
        }
    }

    /// Record the last day covered by an activity sync and bump the shared
    /// last-sync timestamp.
    pub async fn mark_last_activity(&self, date: NaiveDate) -> Result<()> {
        self.db
            .set_state(keys::LAST_ACTIVITY_SYNC_DATE, &date.format("%Y-%m-%d").to_string())
            .await?;
        self.touch_last_sync().await
    }

    /// Record the last day covered by a distance sync and bump the shared
    /// last-sync timestamp.
    pub async fn mark_last_distance(&self, entries: &[DistanceDayEntry]) -> Result<()> {
        if let Some(latest) = entries.iter().map(|entry| entry.date).max() {
            self.mark_last_activity(latest).await?;
        }
        Ok(())
    }

    /// When the last activity/distance sync completed, if any
    pub async fn last_sync_date(&self) -> Result<Option<DateTime<Utc>>> {
        let value = self.db.get_state(keys::LAST_SYNC_DATE).await?;
        Ok(value
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Whether first-time setup has completed
    pub async fn setup_finished(&self) -> Result<bool> {
        let value = self.db.get_state(keys::SETUP_FINISHED).await?;
        Ok(value.as_deref() == Some("true"))
    }

    /// Mark first-time setup as completed
    pub async fn set_setup_finished(&self) -> Result<()> {
        self.db.set_state(keys::SETUP_FINISHED, "true").await
    }

    async fn touch_last_sync(&self) -> Result<()> {
        self.db
            .set_state(
                keys::LAST_SYNC_DATE,
                &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .await
    }
}

fn newest_workout_end(workouts: &[Workout]) -> Option<DateTime<Utc>> {
    workouts.iter().map(|workout| workout.end).max()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ActivityType;
    use chrono::TimeZone;
    use tempfile::NamedTempFile;

    fn workout_ending_at(secs: i64) -> Workout {
        Workout {
            activity_type: ActivityType::Running,
            start: Utc.timestamp_opt(0, 0).unwrap(),
            end: Utc.timestamp_opt(secs, 0).unwrap(),
            duration_secs: secs as f64,
            total_distance: None,
            total_energy_burned: None,
            elevation_ascended: None,
            source: "test".to_string(),
        }
    }

    async fn tracker() -> (FreshnessTracker, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db = Database::new(temp_file.path()).await.unwrap();
        (FreshnessTracker::new(Arc::new(db)), temp_file)
    }

    #[tokio::test]
    async fn test_workouts_fresh_before_any_marker_and_stale_after_marking() {
        let (tracker, _guard) = tracker().await;
        let workouts = vec![workout_ending_at(10)];

        assert!(tracker.fresh_workouts_available(&workouts).await.unwrap());

        tracker.mark_last_workout(&workouts).await.unwrap();
        assert!(!tracker.fresh_workouts_available(&workouts).await.unwrap());
    }

    #[tokio::test]
    async fn test_newer_workout_is_fresh_again() {
        let (tracker, _guard) = tracker().await;
        let old = vec![workout_ending_at(10)];
        tracker.mark_last_workout(&old).await.unwrap();

        let newer = vec![workout_ending_at(10), workout_ending_at(500)];

        assert!(tracker.fresh_workouts_available(&newer).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_set_is_fresh_only_before_first_marker() {
        let (tracker, _guard) = tracker().await;

        assert!(tracker.fresh_workouts_available(&[]).await.unwrap());

        tracker
            .mark_last_workout(&[workout_ending_at(10)])
            .await
            .unwrap();
        assert!(!tracker.fresh_workouts_available(&[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_activity_freshness_tracks_yesterday() {
        let (tracker, _guard) = tracker().await;
        let today = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();

        // No marker stored yet
        assert!(tracker.fresh_activity_available(today).await.unwrap());

        // Marker far in the future
        tracker
            .mark_last_activity(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap())
            .await
            .unwrap();
        assert!(!tracker.fresh_activity_available(today).await.unwrap());

        // Marker two days back means yesterday is still unsynced
        tracker
            .mark_last_activity(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap())
            .await
            .unwrap();
        assert!(tracker.fresh_activity_available(today).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_last_distance_persists_date_and_sync_timestamp() {
        let (tracker, _guard) = tracker().await;
        let entries = vec![
            DistanceDayEntry::empty(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
            DistanceDayEntry::empty(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
        ];

        tracker.mark_last_distance(&entries).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        assert!(!tracker.fresh_activity_available(today).await.unwrap());
        assert!(tracker.last_sync_date().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_marking_workouts_leaves_shared_sync_timestamp_untouched() {
        let (tracker, _guard) = tracker().await;

        tracker
            .mark_last_workout(&[workout_ending_at(10)])
            .await
            .unwrap();

        assert!(tracker.last_sync_date().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_setup_finished_flag() {
        let (tracker, _guard) = tracker().await;

        assert!(!tracker.setup_finished().await.unwrap());
        tracker.set_setup_finished().await.unwrap();
        assert!(tracker.setup_finished().await.unwrap());
    }
}
