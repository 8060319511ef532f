//! Shared test helpers for creating HealthExporter instances in tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::distances::DistanceSeries;
use crate::error::{Error, RemoteError, Result};
use crate::exporter::HealthExporter;
use crate::reader::HealthRecordReader;
use crate::remote::RemoteFileStore;
use crate::types::{
    ActivitySummary, ActivityType, RepositoryId, VersionToken, Workout,
};

/// In-memory record source with canned data
#[derive(Default)]
pub(crate) struct MockReader {
    pub(crate) workouts: Vec<Workout>,
    pub(crate) activity: Vec<ActivitySummary>,
    pub(crate) series: DistanceSeries,
    pub(crate) fail_workouts: bool,
    /// Date ranges fetch_activity was called with
    pub(crate) activity_ranges: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

#[async_trait]
impl HealthRecordReader for MockReader {
    async fn fetch_workouts(
        &self,
        _start: Option<chrono::DateTime<Utc>>,
        _end: Option<chrono::DateTime<Utc>>,
    ) -> Result<Vec<Workout>> {
        if self.fail_workouts {
            return Err(Error::Other("health store unavailable".to_string()));
        }
        Ok(self.workouts.clone())
    }

    async fn fetch_activity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivitySummary>> {
        self.activity_ranges.lock().unwrap().push((start, end));
        Ok(self
            .activity
            .iter()
            .filter(|summary| summary.date >= start && summary.date <= end)
            .cloned()
            .collect())
    }

    async fn fetch_distance_series(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<DistanceSeries> {
        Ok(self.series.clone())
    }
}

/// One recorded remote write
#[derive(Clone, Debug)]
pub(crate) struct WriteCall {
    pub(crate) path: String,
    pub(crate) content: String,
    pub(crate) message: String,
    pub(crate) version: Option<String>,
}

/// In-memory remote store recording every write
pub(crate) struct MockStore {
    pub(crate) ready: bool,
    /// Existing remote files and their version tokens
    pub(crate) versions: Mutex<HashMap<String, String>>,
    pub(crate) writes: Mutex<Vec<WriteCall>>,
    /// Paths whose writes fail with an HTTP 500
    pub(crate) fail_paths: HashSet<String>,
    /// Cancel the token once this many writes have completed
    pub(crate) cancel_after: Option<(usize, CancellationToken)>,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self {
            ready: true,
            versions: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            fail_paths: HashSet::new(),
            cancel_after: None,
        }
    }

    /// Paths of all recorded writes, in order
    pub(crate) fn written_paths(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.path.clone())
            .collect()
    }

    /// Recorded writes excluding the README
    pub(crate) fn year_file_writes(&self) -> Vec<WriteCall> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.path != "README.md")
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RemoteFileStore for MockStore {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn ensure_repository(&self) -> Result<RepositoryId> {
        Ok(RepositoryId(1))
    }

    async fn read_version(&self, path: &str) -> Result<Option<VersionToken>> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .map(VersionToken))
    }

    async fn write_file(
        &self,
        path: &str,
        content: &str,
        version: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        if self.fail_paths.contains(path) {
            return Err(RemoteError::Http {
                status: 500,
                path: path.to_string(),
            }
            .into());
        }

        let count = {
            let mut writes = self.writes.lock().unwrap();
            writes.push(WriteCall {
                path: path.to_string(),
                content: content.to_string(),
                message: message.to_string(),
                version: version.map(|token| token.0.clone()),
            });
            writes.len()
        };

        let sha = format!("sha-{}", count);
        self.versions
            .lock()
            .unwrap()
            .insert(path.to_string(), sha.clone());

        if let Some((after, token)) = &self.cancel_after
            && count >= *after
        {
            token.cancel();
        }

        Ok(VersionToken(sha))
    }
}

/// Helper to create a test HealthExporter with a scratch database.
/// Returns the exporter and the tempdir (which must be kept alive).
pub(crate) async fn create_test_exporter(
    reader: Arc<dyn HealthRecordReader>,
    store: Arc<dyn RemoteFileStore>,
) -> (HealthExporter, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.persistence.database_path = temp_dir.path().join("state.db");
    config.remote.owner = "alice".to_string();
    config.remote.token = Some("secret".to_string());

    let exporter = HealthExporter::new(config, reader, store).await.unwrap();
    (exporter, temp_dir)
}

/// A one-hour workout starting March 1st at noon of the given year
pub(crate) fn workout_in_year(year: i32) -> Workout {
    let start = Utc
        .with_ymd_and_hms(year, 3, 1, 12, 0, 0)
        .single()
        .unwrap();
    Workout {
        activity_type: ActivityType::Running,
        start,
        end: start + chrono::Duration::hours(1),
        duration_secs: 3600.0,
        total_distance: Some(10_000.0),
        total_energy_burned: Some(600.0),
        elevation_ascended: None,
        source: "test".to_string(),
    }
}

/// An activity summary for the given day
pub(crate) fn summary_on(date: NaiveDate) -> ActivitySummary {
    ActivitySummary {
        date,
        move_actual: Some(500.0),
        move_goal: Some(450.0),
        exercise_actual: Some(30.0),
        exercise_goal: Some(30.0),
        stand_actual: Some(12.0),
        stand_goal: Some(12.0),
    }
}

/// Pin the activity/distance marker into the future so those stages are
/// skipped as already synced
pub(crate) async fn pin_activity_synced(exporter: &HealthExporter) {
    exporter
        .freshness
        .mark_last_activity(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap())
        .await
        .unwrap();
}
