//! Export orchestrator
//!
//! The `HealthExporter` struct and its methods are organized by domain:
//! - [`orchestration`] - The staged export run loop
//!
//! The exporter holds its collaborators — record reader and remote store —
//! as injected trait objects, so platform bindings and test doubles plug
//! in the same way.

mod orchestration;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use orchestration::ExportOptions;

use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::freshness::FreshnessTracker;
use crate::reader::HealthRecordReader;
use crate::remote::RemoteFileStore;
use crate::types::{Event, ExportStage};

/// Main exporter instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct HealthExporter {
    /// Database instance holding sync-state markers
    pub(crate) db: Arc<Database>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Source of raw health records
    pub(crate) reader: Arc<dyn HealthRecordReader>,
    /// Versioned remote content store
    pub(crate) store: Arc<dyn RemoteFileStore>,
    /// Freshness checks and marker persistence
    pub(crate) freshness: FreshnessTracker,
    /// Stage of the current (or last) run
    pub(crate) stage: Arc<std::sync::RwLock<ExportStage>>,
    /// Guard serializing export runs (a single run at a time)
    pub(crate) run_guard: Arc<tokio::sync::Mutex<()>>,
}

impl HealthExporter {
    /// Create a new exporter instance
    ///
    /// Opens (or creates) the sync-state database, runs migrations and
    /// sets up the event broadcast channel. The reader and store are the
    /// engine's only collaborators and are injected here.
    pub async fn new(
        config: Config,
        reader: Arc<dyn HealthRecordReader>,
        store: Arc<dyn RemoteFileStore>,
    ) -> Result<Self> {
        let db = Arc::new(Database::new(&config.persistence.database_path).await?);

        // Buffered channel; slow subscribers lag rather than block the run
        let (event_tx, _rx) = tokio::sync::broadcast::channel(256);

        Ok(Self {
            freshness: FreshnessTracker::new(db.clone()),
            db,
            event_tx,
            config: Arc::new(config),
            reader,
            store,
            stage: Arc::new(std::sync::RwLock::new(ExportStage::Idle)),
            run_guard: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Subscribe to export events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. A subscriber that falls behind the channel buffer
    /// receives a `RecvError::Lagged` error.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Access the freshness tracker backing this exporter.
    ///
    /// Useful for glue layers that want to show "last synced" information
    /// or decide whether scheduling a run is worthwhile.
    pub fn freshness(&self) -> &FreshnessTracker {
        &self.freshness
    }

    /// Stage of the currently running (or last finished) export
    pub fn current_stage(&self) -> ExportStage {
        self.stage.read().map(|stage| *stage).unwrap_or(ExportStage::Idle)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// the export continues even when no one is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine
        self.event_tx.send(event).ok();
    }

    /// Enter a new stage and broadcast the transition
    pub(crate) fn set_stage(&self, stage: ExportStage) {
        if let Ok(mut current) = self.stage.write() {
            *current = stage;
        }
        self.emit_event(Event::StageChanged { stage });
    }
}
