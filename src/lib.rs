//! # pulselog
//!
//! Embeddable engine that exports personal health activity — workouts,
//! daily activity summaries, and distance/step series — into yearly CSV
//! files stored in a version-controlled remote repository.
//!
//! ## Design Philosophy
//!
//! pulselog is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Incremental** - Freshness markers avoid re-syncing unchanged years
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Injectable** - The health record source and the remote store are
//!   traits; platform bindings and test doubles plug in the same way
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use pulselog::{
//!     Config, GithubContentStore, HealthExporter, HealthRecordReader, Result,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! // Platform bindings implement the record source; this one is empty.
//! struct NoopReader;
//!
//! #[async_trait]
//! impl HealthRecordReader for NoopReader {
//!     async fn fetch_workouts(
//!         &self,
//!         _start: Option<chrono::DateTime<chrono::Utc>>,
//!         _end: Option<chrono::DateTime<chrono::Utc>>,
//!     ) -> Result<Vec<pulselog::Workout>> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn fetch_activity(
//!         &self,
//!         _start: chrono::NaiveDate,
//!         _end: chrono::NaiveDate,
//!     ) -> Result<Vec<pulselog::ActivitySummary>> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn fetch_distance_series(
//!         &self,
//!         _start: chrono::NaiveDate,
//!         _end: chrono::NaiveDate,
//!     ) -> Result<pulselog::distances::DistanceSeries> {
//!         Ok(Default::default())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut config = Config::default();
//!     config.remote.owner = "alice".to_string();
//!     config.remote.token = Some(std::env::var("GITHUB_TOKEN").unwrap_or_default());
//!
//!     let store = Arc::new(GithubContentStore::new(&config.remote)?);
//!     let exporter = HealthExporter::new(config, Arc::new(NoopReader), store).await?;
//!
//!     // Subscribe to events
//!     let mut events = exporter.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     exporter.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Per-day distance entry synthesis
pub mod distances;
/// Error types
pub mod error;
/// Export orchestrator
pub mod exporter;
/// Freshness tracking for export stages
pub mod freshness;
/// Year bucketing for export records
pub mod partition;
/// Record source interface
pub mod reader;
/// Remote content store interface and implementations
pub mod remote;
/// CSV rendering for export records
pub mod render;
/// Pause-adjusted duration computation for workout samples
pub mod splits;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, ExportConfig, PersistenceConfig, RemoteConfig};
pub use db::Database;
pub use error::{DatabaseError, Error, RemoteError, Result};
pub use exporter::{ExportOptions, HealthExporter};
pub use freshness::FreshnessTracker;
pub use partition::{YearBuckets, partition_by_year};
pub use reader::HealthRecordReader;
pub use remote::{GithubContentStore, RemoteFileStore};
pub use splits::{PauseInterval, Sample, Split, adjusted_duration, build_splits, format_elapsed};
pub use types::{
    ActivitySummary, ActivityType, DistanceDayEntry, Event, ExportStage, ExportSummary,
    RecordKind, RepositoryId, VersionToken, Workout, Year,
};
