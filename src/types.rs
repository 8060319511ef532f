//! Core types for pulselog

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A four-digit calendar year used as the bucketing key for exports.
///
/// Years are compared and sorted numerically; formatting always produces
/// exactly four digits so remote file names stay stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(pub i32);

impl Year {
    /// Create a new Year
    pub fn new(year: i32) -> Self {
        Self(year)
    }

    /// Get the inner i32 value
    pub fn get(&self) -> i32 {
        self.0
    }
}

impl From<i32> for Year {
    fn from(year: i32) -> Self {
        Self(year)
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Opaque version identifier of a remote file's current content.
///
/// Returned by the remote store when a file exists; passing it back on a
/// write makes the write conditional on the file being unchanged. Absence
/// means "create new file".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(pub String);

impl VersionToken {
    /// Create a new VersionToken
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the inner token string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the remote repository the export targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(pub i64);

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of health record a file or export stage deals with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Individual workouts
    Workouts,
    /// Daily activity ring summaries
    Activity,
    /// Per-day distance and step totals
    Distances,
}

impl RecordKind {
    /// Remote directory this kind's yearly files are written under
    pub fn directory(&self) -> &'static str {
        match self {
            RecordKind::Workouts => "workouts",
            RecordKind::Activity => "activity",
            RecordKind::Distances => "distances",
        }
    }

    /// Remote path for one year's file of this kind, e.g. `workouts/2026.csv`
    pub fn path_for_year(&self, year: Year) -> String {
        format!("{}/{}.csv", self.directory(), year)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.directory())
    }
}

/// Workout activity classification
///
/// Covers the activity kinds that commonly appear in exported data. Raw
/// codes outside this set map to [`ActivityType::Other`] so a single
/// unrecognized workout never breaks a year's file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Running
    Running,
    /// Walking
    Walking,
    /// Cycling
    Cycling,
    /// Swimming
    Swimming,
    /// Hiking
    Hiking,
    /// Rowing
    Rowing,
    /// Yoga
    Yoga,
    /// Functional strength training
    FunctionalStrengthTraining,
    /// Traditional strength training
    TraditionalStrengthTraining,
    /// High-intensity interval training
    HighIntensityIntervalTraining,
    /// Elliptical trainer
    Elliptical,
    /// Stair climbing
    StairClimbing,
    /// Downhill skiing
    DownhillSkiing,
    /// Snowboarding
    Snowboarding,
    /// Wheelchair pace (walking)
    WheelchairWalkPace,
    /// Wheelchair pace (running)
    WheelchairRunPace,
    /// Dance
    Dance,
    /// Core training
    CoreTraining,
    /// Cooldown
    Cooldown,
    /// Anything not covered above
    Other,
}

impl ActivityType {
    /// Human-readable name used in CSV output
    pub fn name(&self) -> &'static str {
        match self {
            ActivityType::Running => "Running",
            ActivityType::Walking => "Walking",
            ActivityType::Cycling => "Cycling",
            ActivityType::Swimming => "Swimming",
            ActivityType::Hiking => "Hiking",
            ActivityType::Rowing => "Rowing",
            ActivityType::Yoga => "Yoga",
            ActivityType::FunctionalStrengthTraining => "Functional Strength Training",
            ActivityType::TraditionalStrengthTraining => "Traditional Strength Training",
            ActivityType::HighIntensityIntervalTraining => "High Intensity Interval Training",
            ActivityType::Elliptical => "Elliptical",
            ActivityType::StairClimbing => "Stair Climbing",
            ActivityType::DownhillSkiing => "Downhill Skiing",
            ActivityType::Snowboarding => "Snowboarding",
            ActivityType::WheelchairWalkPace => "Wheelchair Walk Pace",
            ActivityType::WheelchairRunPace => "Wheelchair Run Pace",
            ActivityType::Dance => "Dance",
            ActivityType::CoreTraining => "Core Training",
            ActivityType::Cooldown => "Cooldown",
            ActivityType::Other => "Other",
        }
    }

    /// Emoji associated with this activity, if it has a natural one
    pub fn emoji(&self) -> Option<&'static str> {
        match self {
            ActivityType::Running => Some("\u{1F3C3}"),
            ActivityType::Walking => Some("\u{1F6B6}"),
            ActivityType::Cycling => Some("\u{1F6B4}"),
            ActivityType::Swimming => Some("\u{1F3CA}"),
            ActivityType::Hiking => Some("\u{1F97E}"),
            ActivityType::Rowing => Some("\u{1F6A3}"),
            ActivityType::Yoga => Some("\u{1F9D8}"),
            ActivityType::FunctionalStrengthTraining
            | ActivityType::TraditionalStrengthTraining => Some("\u{1F3CB}"),
            ActivityType::HighIntensityIntervalTraining => Some("\u{1F525}"),
            ActivityType::DownhillSkiing => Some("\u{26F7}"),
            ActivityType::Snowboarding => Some("\u{1F3C2}"),
            ActivityType::WheelchairWalkPace | ActivityType::WheelchairRunPace => Some("\u{1F9BD}"),
            ActivityType::Dance => Some("\u{1F483}"),
            _ => None,
        }
    }

    /// All concrete activity types, excluding the catch-all [`ActivityType::Other`]
    pub fn values() -> &'static [ActivityType] {
        &[
            ActivityType::Running,
            ActivityType::Walking,
            ActivityType::Cycling,
            ActivityType::Swimming,
            ActivityType::Hiking,
            ActivityType::Rowing,
            ActivityType::Yoga,
            ActivityType::FunctionalStrengthTraining,
            ActivityType::TraditionalStrengthTraining,
            ActivityType::HighIntensityIntervalTraining,
            ActivityType::Elliptical,
            ActivityType::StairClimbing,
            ActivityType::DownhillSkiing,
            ActivityType::Snowboarding,
            ActivityType::WheelchairWalkPace,
            ActivityType::WheelchairRunPace,
            ActivityType::Dance,
            ActivityType::CoreTraining,
            ActivityType::Cooldown,
        ]
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single recorded workout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Activity classification
    pub activity_type: ActivityType,
    /// When the workout started
    pub start: DateTime<Utc>,
    /// When the workout ended
    pub end: DateTime<Utc>,
    /// Active duration in seconds
    pub duration_secs: f64,
    /// Total distance in meters, if the workout recorded one
    pub total_distance: Option<f64>,
    /// Total energy burned in kilocalories, if recorded
    pub total_energy_burned: Option<f64>,
    /// Elevation ascended in meters, from optional workout metadata
    pub elevation_ascended: Option<f64>,
    /// Name of the app or device that recorded the workout
    pub source: String,
}

/// One day's activity ring summary
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// The day this summary covers
    pub date: NaiveDate,
    /// Active energy burned in kilocalories
    pub move_actual: Option<f64>,
    /// Active energy goal in kilocalories
    pub move_goal: Option<f64>,
    /// Exercise minutes
    pub exercise_actual: Option<f64>,
    /// Exercise minutes goal
    pub exercise_goal: Option<f64>,
    /// Stand hours
    pub stand_actual: Option<f64>,
    /// Stand hours goal
    pub stand_goal: Option<f64>,
}

/// Per-day distance, step and stroke totals
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceDayEntry {
    /// The day this entry covers
    pub date: NaiveDate,
    /// Walking/running distance in meters
    pub walking_running: Option<f64>,
    /// Step count
    pub steps: Option<f64>,
    /// Swimming distance in meters
    pub swimming: Option<f64>,
    /// Stroke count
    pub strokes: Option<f64>,
    /// Cycling distance in meters
    pub cycling: Option<f64>,
    /// Wheelchair distance in meters
    pub wheelchair: Option<f64>,
    /// Elevation descended in meters (downhill sports)
    pub elevation_descended: Option<f64>,
}

impl DistanceDayEntry {
    /// Create an empty entry for a day; all quantities render as defaults
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }
}

/// Stage the export orchestrator is currently in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    /// No run in progress
    Idle,
    /// Resolving or creating the remote repository
    FetchingRepository,
    /// Refreshing the repository README (first-time setup only)
    UpdatingReadme,
    /// Exporting workout records
    ExportingWorkouts,
    /// Exporting activity summaries
    ExportingActivity,
    /// Exporting distance day entries
    ExportingDistances,
    /// Run completed
    Finished,
    /// Run ended early after a stop request
    Stopped,
}

/// Event emitted during an export run
///
/// Events are broadcast to all subscribers; if no one is listening they
/// are dropped silently.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The orchestrator entered a new stage
    StageChanged {
        /// The stage that just started
        stage: ExportStage,
    },

    /// The remote repository was resolved (or created)
    RepositoryReady {
        /// Remote repository identifier
        id: RepositoryId,
    },

    /// One year's file was written to the remote store
    YearWritten {
        /// Record kind the file belongs to
        kind: RecordKind,
        /// The exported year
        year: Year,
        /// Remote path of the written file
        path: String,
        /// Version token of the new remote content
        version: VersionToken,
    },

    /// One year's write failed; the run continues with the next year
    YearFailed {
        /// Record kind the file belongs to
        kind: RecordKind,
        /// The year whose write failed
        year: Year,
        /// Error description
        error: String,
    },

    /// An export stage was skipped because no fresh data was available
    StageSkipped {
        /// Record kind whose stage was skipped
        kind: RecordKind,
    },

    /// The run finished (completed or stopped)
    ExportFinished {
        /// Number of yearly files written across all stages
        files_written: usize,
        /// Whether the run ended early due to a stop request
        stopped: bool,
    },
}

/// Outcome of a completed (or stopped) export run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Number of yearly files written across all stages
    pub files_written: usize,
    /// Number of yearly writes that failed and were skipped
    pub files_failed: usize,
    /// Number of records excluded because their date could not be bucketed
    pub records_skipped: usize,
    /// Whether the run ended early due to a stop request
    pub stopped: bool,
}
