//! Staged export run loop.
//!
//! Stages run strictly sequentially: repository resolution, README refresh
//! (first run only), then one export stage per record kind. Within a stage
//! years are written ascending, one at a time; a failed year is logged and
//! skipped, never fatal. Cancellation is cooperative and checked before
//! each unit of work, so an in-flight write always completes.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

use crate::distances;
use crate::error::{Error, Result};
use crate::partition::partition_by_year;
use crate::render;
use crate::types::{Event, ExportStage, ExportSummary, RecordKind, Year};

use super::HealthExporter;

/// Options controlling a single export run
#[derive(Clone, Copy, Debug, Default)]
pub struct ExportOptions {
    /// Export even when freshness markers say nothing new is available
    pub force: bool,
}

/// Per-stage write counters
#[derive(Debug, Default)]
struct StageOutcome {
    written: usize,
    failed: usize,
    stopped: bool,
}

impl StageOutcome {
    /// Markers only advance after a stage got all its writes through
    fn clean(&self) -> bool {
        self.failed == 0 && !self.stopped
    }
}

impl HealthExporter {
    /// Run a full export with default options.
    ///
    /// See [`HealthExporter::run_with_options`].
    pub async fn run(&self, cancel: CancellationToken) -> Result<ExportSummary> {
        self.run_with_options(cancel, ExportOptions::default()).await
    }

    /// Run a full export: resolve the repository, refresh the README on
    /// first-time setup, then export workouts, activity and distances as
    /// yearly CSV files.
    ///
    /// Only one run executes at a time; a second call while a run is in
    /// progress fails with [`Error::RunInProgress`]. A cancelled run is
    /// not an error: it produces a summary with `stopped == true` and
    /// fires the finish event exactly like a completed run.
    pub async fn run_with_options(
        &self,
        cancel: CancellationToken,
        options: ExportOptions,
    ) -> Result<ExportSummary> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| Error::RunInProgress)?;

        if !self.store.is_ready() {
            return Err(Error::NotReady(
                "remote store credentials or repository not configured".to_string(),
            ));
        }

        self.set_stage(ExportStage::FetchingRepository);
        let repository = self.store.ensure_repository().await?;
        self.emit_event(Event::RepositoryReady { id: repository });

        let first_run = !self.freshness.setup_finished().await?;
        if first_run {
            self.set_stage(ExportStage::UpdatingReadme);
            let template = self.config.export.readme_template.clone();
            if let Err(e) = self
                .store
                .update_file("README.md", &template, "Update README")
                .await
            {
                tracing::warn!(error = %e, "README update failed, continuing");
            }
        }

        let today = Utc::now().date_naive();
        let activity_fresh =
            options.force || self.freshness.fresh_activity_available(today).await?;

        let mut summary = ExportSummary {
            files_written: 0,
            files_failed: 0,
            records_skipped: 0,
            stopped: false,
        };

        self.export_workouts(&cancel, options, &mut summary).await?;
        self.export_activity(&cancel, today, activity_fresh, &mut summary)
            .await?;
        self.export_distances(&cancel, today, activity_fresh, &mut summary)
            .await?;

        summary.stopped = cancel.is_cancelled();
        self.freshness.set_setup_finished().await?;

        self.set_stage(if summary.stopped {
            ExportStage::Stopped
        } else {
            ExportStage::Finished
        });
        self.emit_event(Event::ExportFinished {
            files_written: summary.files_written,
            stopped: summary.stopped,
        });

        tracing::info!(
            files_written = summary.files_written,
            files_failed = summary.files_failed,
            stopped = summary.stopped,
            "Export run finished"
        );

        Ok(summary)
    }

    async fn export_workouts(
        &self,
        cancel: &CancellationToken,
        options: ExportOptions,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Ok(());
        }
        self.set_stage(ExportStage::ExportingWorkouts);

        let workouts = match self.reader.fetch_workouts(None, None).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Workout fetch failed, treating as no data");
                Vec::new()
            }
        };
        if workouts.is_empty() {
            tracing::debug!("No workouts to export");
            return Ok(());
        }

        if !options.force && !self.freshness.fresh_workouts_available(&workouts).await? {
            tracing::info!("No fresh workouts since last sync, skipping stage");
            self.emit_event(Event::StageSkipped {
                kind: RecordKind::Workouts,
            });
            return Ok(());
        }

        let latest = workouts.iter().max_by_key(|workout| workout.end).cloned();
        let partitioned =
            partition_by_year(workouts, |workout| Some(Year::new(workout.start.year())));
        summary.records_skipped += partitioned.skipped;

        let outcome = self
            .write_year_files(
                RecordKind::Workouts,
                &partitioned.buckets,
                render::render_workouts,
                cancel,
            )
            .await;

        if outcome.clean()
            && let Some(workout) = &latest
        {
            self.freshness
                .mark_last_workout(std::slice::from_ref(workout))
                .await?;
        }

        summary.files_written += outcome.written;
        summary.files_failed += outcome.failed;
        Ok(())
    }

    async fn export_activity(
        &self,
        cancel: &CancellationToken,
        today: NaiveDate,
        activity_fresh: bool,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Ok(());
        }
        self.set_stage(ExportStage::ExportingActivity);

        if !activity_fresh {
            tracing::info!("Activity already synced through yesterday, skipping stage");
            self.emit_event(Event::StageSkipped {
                kind: RecordKind::Activity,
            });
            return Ok(());
        }

        // Activity summaries only settle once the day is over; today's
        // summary is still changing and is left for the next run
        let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
            return Ok(());
        };
        let start = self.config.export.history_start;
        if yesterday < start {
            return Ok(());
        }

        let summaries = match self.reader.fetch_activity(start, yesterday).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Activity fetch failed, treating as no data");
                Vec::new()
            }
        };
        if summaries.is_empty() {
            tracing::debug!("No activity summaries to export");
            return Ok(());
        }

        let partitioned =
            partition_by_year(summaries, |record| Some(Year::new(record.date.year())));
        summary.records_skipped += partitioned.skipped;

        let outcome = self
            .write_year_files(
                RecordKind::Activity,
                &partitioned.buckets,
                render::render_activity,
                cancel,
            )
            .await;

        summary.files_written += outcome.written;
        summary.files_failed += outcome.failed;
        Ok(())
    }

    async fn export_distances(
        &self,
        cancel: &CancellationToken,
        today: NaiveDate,
        activity_fresh: bool,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Ok(());
        }
        self.set_stage(ExportStage::ExportingDistances);

        if !activity_fresh {
            tracing::info!("Distances already synced through yesterday, skipping stage");
            self.emit_event(Event::StageSkipped {
                kind: RecordKind::Distances,
            });
            return Ok(());
        }

        let start = self.config.export.history_start;
        let series = match self.reader.fetch_distance_series(start, today).await {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(error = %e, "Distance fetch failed, treating as no data");
                return Ok(());
            }
        };

        let entries = distances::day_entries(start, today, today, &series);
        if entries.is_empty() {
            tracing::debug!("No distance entries to export");
            return Ok(());
        }

        let latest = entries.iter().max_by_key(|entry| entry.date).cloned();
        let partitioned = partition_by_year(entries, |entry| Some(Year::new(entry.date.year())));
        summary.records_skipped += partitioned.skipped;

        let outcome = self
            .write_year_files(
                RecordKind::Distances,
                &partitioned.buckets,
                render::render_distances,
                cancel,
            )
            .await;

        // Advancing the distance marker also bumps the shared last-sync
        // timestamp; the workout marker intentionally does not
        if outcome.clean()
            && let Some(entry) = &latest
        {
            self.freshness
                .mark_last_distance(std::slice::from_ref(entry))
                .await?;
        }

        summary.files_written += outcome.written;
        summary.files_failed += outcome.failed;
        Ok(())
    }

    /// Write one year's file after another, ascending, stopping early on a
    /// cancel request. Failed years are skipped; the stage keeps going.
    async fn write_year_files<T>(
        &self,
        kind: RecordKind,
        buckets: &BTreeMap<Year, Vec<T>>,
        render: impl Fn(&[T]) -> String,
        cancel: &CancellationToken,
    ) -> StageOutcome {
        let mut outcome = StageOutcome::default();

        for (year, records) in buckets {
            if cancel.is_cancelled() {
                tracing::info!(kind = %kind, "Stop requested, ending stage early");
                outcome.stopped = true;
                break;
            }

            let path = kind.path_for_year(*year);
            let content = render(records);
            let message = format!("Update {}", path);

            match self.store.update_file(&path, &content, &message).await {
                Ok(version) => {
                    tracing::info!(kind = %kind, year = %year, path = %path, "Exported year file");
                    outcome.written += 1;
                    self.emit_event(Event::YearWritten {
                        kind,
                        year: *year,
                        path,
                        version,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        kind = %kind,
                        year = %year,
                        error = %e,
                        "Year write failed, continuing with next year"
                    );
                    outcome.failed += 1;
                    self.emit_event(Event::YearFailed {
                        kind,
                        year: *year,
                        error: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}
