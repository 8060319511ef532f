use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::exporter::ExportOptions;
use crate::exporter::test_helpers::{
    MockReader, MockStore, create_test_exporter, pin_activity_synced, summary_on, workout_in_year,
};
use crate::types::{Event, ExportStage, RecordKind};

fn collect_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_export_writes_years_ascending() {
    let reader = Arc::new(MockReader {
        workouts: vec![
            workout_in_year(2021),
            workout_in_year(2019),
            workout_in_year(2020),
        ],
        ..MockReader::default()
    });
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();
    pin_activity_synced(&exporter).await;

    let summary = exporter.run(CancellationToken::new()).await.unwrap();

    assert_eq!(
        store.written_paths(),
        vec![
            "workouts/2019.csv",
            "workouts/2020.csv",
            "workouts/2021.csv"
        ]
    );
    assert_eq!(summary.files_written, 3);
    assert_eq!(summary.files_failed, 0);
    assert!(!summary.stopped);
    assert_eq!(exporter.current_stage(), ExportStage::Finished);
}

#[tokio::test]
async fn test_pre_cancelled_run_writes_nothing_but_still_finishes() {
    let reader = Arc::new(MockReader {
        workouts: vec![workout_in_year(2026)],
        ..MockReader::default()
    });
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();
    let mut events = exporter.subscribe();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let summary = exporter.run(cancel).await.unwrap();

    assert!(store.written_paths().is_empty());
    assert!(summary.stopped);
    assert_eq!(summary.files_written, 0);
    assert_eq!(exporter.current_stage(), ExportStage::Stopped);

    let finished = collect_events(&mut events)
        .into_iter()
        .find(|event| matches!(event, Event::ExportFinished { .. }));
    assert!(matches!(
        finished,
        Some(Event::ExportFinished {
            files_written: 0,
            stopped: true
        })
    ));
}

#[tokio::test]
async fn test_stop_after_first_write_completes_gracefully() {
    let cancel = CancellationToken::new();
    let reader = Arc::new(MockReader {
        workouts: vec![workout_in_year(2025), workout_in_year(2026)],
        ..MockReader::default()
    });
    let mut store = MockStore::new();
    store.cancel_after = Some((1, cancel.clone()));
    let store = Arc::new(store);
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();
    pin_activity_synced(&exporter).await;

    let summary = exporter.run(cancel).await.unwrap();

    assert_eq!(store.written_paths(), vec!["workouts/2025.csv"]);
    assert_eq!(summary.files_written, 1);
    assert!(summary.stopped);
}

#[tokio::test]
async fn test_failed_year_is_skipped_and_run_continues() {
    let workouts = vec![
        workout_in_year(2019),
        workout_in_year(2020),
        workout_in_year(2021),
    ];
    let reader = Arc::new(MockReader {
        workouts: workouts.clone(),
        ..MockReader::default()
    });
    let mut store = MockStore::new();
    store.fail_paths = HashSet::from(["workouts/2020.csv".to_string()]);
    let store = Arc::new(store);
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();
    pin_activity_synced(&exporter).await;
    let mut events = exporter.subscribe();

    let summary = exporter.run(CancellationToken::new()).await.unwrap();

    assert_eq!(
        store.written_paths(),
        vec!["workouts/2019.csv", "workouts/2021.csv"]
    );
    assert_eq!(summary.files_written, 2);
    assert_eq!(summary.files_failed, 1);
    assert!(!summary.stopped);

    let failed: Vec<Event> = collect_events(&mut events)
        .into_iter()
        .filter(|event| matches!(event, Event::YearFailed { .. }))
        .collect();
    assert_eq!(failed.len(), 1);

    // A stage with a failed write must not advance its marker, so the
    // next run retries the whole set
    assert!(
        exporter
            .freshness
            .fresh_workouts_available(&workouts)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_unready_store_fails_before_any_stage() {
    let reader = Arc::new(MockReader {
        workouts: vec![workout_in_year(2026)],
        ..MockReader::default()
    });
    let mut store = MockStore::new();
    store.ready = false;
    let store = Arc::new(store);
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;

    let err = exporter.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, Error::NotReady(_)));
    assert!(store.written_paths().is_empty());
    assert_eq!(exporter.current_stage(), ExportStage::Idle);
}

#[tokio::test]
async fn test_second_run_skips_stale_workouts() {
    let workouts = vec![workout_in_year(2026)];
    let reader = Arc::new(MockReader {
        workouts: workouts.clone(),
        ..MockReader::default()
    });
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();
    pin_activity_synced(&exporter).await;

    exporter.run(CancellationToken::new()).await.unwrap();
    assert_eq!(store.written_paths().len(), 1);

    let mut events = exporter.subscribe();
    let summary = exporter.run(CancellationToken::new()).await.unwrap();

    assert_eq!(summary.files_written, 0);
    assert_eq!(store.written_paths().len(), 1);

    let skipped: Vec<Event> = collect_events(&mut events)
        .into_iter()
        .filter(|event| {
            matches!(
                event,
                Event::StageSkipped {
                    kind: RecordKind::Workouts
                }
            )
        })
        .collect();
    assert_eq!(skipped.len(), 1);
}

#[tokio::test]
async fn test_force_reexports_stale_workouts() {
    let reader = Arc::new(MockReader {
        workouts: vec![workout_in_year(2026)],
        ..MockReader::default()
    });
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();
    pin_activity_synced(&exporter).await;

    exporter.run(CancellationToken::new()).await.unwrap();
    let summary = exporter
        .run_with_options(CancellationToken::new(), ExportOptions { force: true })
        .await
        .unwrap();

    // Force bypasses both gates: the workout file again, plus the
    // current-year distance file the pinned marker had been holding back
    let workout_writes = store
        .written_paths()
        .iter()
        .filter(|path| path.starts_with("workouts/"))
        .count();
    assert_eq!(workout_writes, 2);
    assert_eq!(summary.files_written, 2);
}

#[tokio::test]
async fn test_first_run_refreshes_readme_exactly_once() {
    let reader = Arc::new(MockReader::default());
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    pin_activity_synced(&exporter).await;

    let summary = exporter.run(CancellationToken::new()).await.unwrap();

    assert_eq!(store.written_paths(), vec!["README.md"]);
    // The README does not count as a year file
    assert_eq!(summary.files_written, 0);
    assert!(exporter.freshness.setup_finished().await.unwrap());

    exporter.run(CancellationToken::new()).await.unwrap();
    assert_eq!(store.written_paths(), vec!["README.md"]);
}

#[tokio::test]
async fn test_readme_failure_does_not_abort_the_run() {
    let reader = Arc::new(MockReader {
        workouts: vec![workout_in_year(2026)],
        ..MockReader::default()
    });
    let mut store = MockStore::new();
    store.fail_paths = HashSet::from(["README.md".to_string()]);
    let store = Arc::new(store);
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    pin_activity_synced(&exporter).await;

    let summary = exporter.run(CancellationToken::new()).await.unwrap();

    assert_eq!(summary.files_written, 1);
    assert_eq!(store.written_paths(), vec!["workouts/2026.csv"]);
}

#[tokio::test]
async fn test_reader_failure_is_treated_as_no_data() {
    let reader = Arc::new(MockReader {
        fail_workouts: true,
        ..MockReader::default()
    });
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();
    pin_activity_synced(&exporter).await;

    let summary = exporter.run(CancellationToken::new()).await.unwrap();

    assert_eq!(summary.files_written, 0);
    assert!(store.written_paths().is_empty());
    assert_eq!(exporter.current_stage(), ExportStage::Finished);
}

#[tokio::test]
async fn test_activity_window_runs_through_yesterday() {
    let today = Utc::now().date_naive();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();

    let reader = Arc::new(MockReader {
        activity: vec![summary_on(yesterday), summary_on(today)],
        ..MockReader::default()
    });
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader.clone(), store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();

    exporter.run(CancellationToken::new()).await.unwrap();

    let ranges = reader.activity_ranges.lock().unwrap().clone();
    assert_eq!(
        ranges,
        vec![(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(), yesterday)]
    );

    // Today's summary lies outside the window; only yesterday's row lands
    // in the activity file
    let activity_writes: Vec<_> = store
        .year_file_writes()
        .into_iter()
        .filter(|call| call.path.starts_with("activity/"))
        .collect();
    assert_eq!(activity_writes.len(), 1);
    assert_eq!(
        activity_writes[0].path,
        format!("activity/{}.csv", yesterday.year())
    );
    assert_eq!(activity_writes[0].content.lines().count(), 2);
}

#[tokio::test]
async fn test_distances_cover_current_year_and_advance_marker() {
    let today = Utc::now().date_naive();

    let reader = Arc::new(MockReader::default());
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();

    let summary = exporter.run(CancellationToken::new()).await.unwrap();

    // An empty series still yields the current year's days
    let distance_writes: Vec<_> = store
        .year_file_writes()
        .into_iter()
        .filter(|call| call.path.starts_with("distances/"))
        .collect();
    assert_eq!(distance_writes.len(), 1);
    assert_eq!(
        distance_writes[0].path,
        format!("distances/{}.csv", today.year())
    );
    assert_eq!(
        distance_writes[0].content.lines().count(),
        today.ordinal() as usize + 1
    );
    assert!(summary.files_written >= 1);

    // The distance stage advances the shared activity marker
    assert!(
        !exporter
            .freshness
            .fresh_activity_available(today)
            .await
            .unwrap()
    );
    assert!(exporter.freshness.last_sync_date().await.unwrap().is_some());
}

#[tokio::test]
async fn test_year_writes_reuse_remote_version_tokens() {
    let reader = Arc::new(MockReader {
        workouts: vec![workout_in_year(2026)],
        ..MockReader::default()
    });
    let store = Arc::new(MockStore::new());
    store
        .versions
        .lock()
        .unwrap()
        .insert("workouts/2026.csv".to_string(), "existing-sha".to_string());
    let (exporter, _guard) = create_test_exporter(reader, store.clone()).await;
    exporter.freshness.set_setup_finished().await.unwrap();
    pin_activity_synced(&exporter).await;

    exporter.run(CancellationToken::new()).await.unwrap();

    let writes = store.year_file_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].version.as_deref(), Some("existing-sha"));
    assert_eq!(writes[0].message, "Update workouts/2026.csv");
}

#[tokio::test]
async fn test_concurrent_runs_are_rejected() {
    let reader = Arc::new(MockReader::default());
    let store = Arc::new(MockStore::new());
    let (exporter, _guard) = create_test_exporter(reader, store).await;

    let _held = exporter.run_guard.clone().try_lock_owned().unwrap();

    let err = exporter.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, Error::RunInProgress));
}
