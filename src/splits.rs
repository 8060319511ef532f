//! Pause-adjusted duration computation for segmented workout samples
//!
//! Workout time series arrive as samples with start/end timestamps plus a
//! list of pause intervals the user recorded. Active duration for a sample
//! is the wall-clock span from the previous processed sample's end (the
//! boundary) to this sample's end, minus any overlap with pauses. The
//! boundary anchoring supports cumulative split computation across a
//! stream of samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time range `[start, end)` during which activity tracking was paused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseInterval {
    /// When the pause began
    pub start: DateTime<Utc>,
    /// When tracking resumed
    pub end: DateTime<Utc>,
}

/// A single time-series measurement
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the measurement window began
    pub start: DateTime<Utc>,
    /// When the measurement window ended
    pub end: DateTime<Utc>,
    /// Measured quantity (meters for distance samples)
    pub quantity: f64,
}

/// One distance split derived from a sample stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// 1-based split ordinal
    pub index: usize,
    /// Distance covered in this split, in the samples' unit
    pub distance: f64,
    /// Pause-adjusted active duration of this split in seconds
    pub duration_secs: f64,
}

impl Split {
    /// Active duration formatted as `HH:MM:SS.mmm`
    pub fn formatted_duration(&self) -> String {
        format_elapsed(self.duration_secs)
    }
}

/// Signed span between two instants in seconds, with sub-second precision
fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let span = end - start;
    match span.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        // Spans beyond microsecond-representable range lose sub-ms precision
        None => span.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Compute a sample's active duration, subtracting pause overlap.
///
/// The window runs from `last_boundary` (the previous processed sample's
/// end) to the sample's end. Pauses may arrive unsorted; each one is
/// checked independently. Non-overlapping pauses inside one window reduce
/// the result additively. The result never goes below zero.
pub fn adjusted_duration(
    pauses: &[PauseInterval],
    sample: &Sample,
    last_boundary: DateTime<Utc>,
) -> f64 {
    let window_start = last_boundary;
    let window_end = sample.end;
    let mut duration = seconds_between(window_start, window_end);

    for pause in pauses {
        if pause.start <= window_start && pause.end >= window_end {
            // Pause swallows the whole window; nothing was active
            return 0.0;
        } else if pause.start <= window_start && pause.end > window_start && pause.end < window_end
        {
            duration -= seconds_between(window_start, pause.end);
        } else if pause.start >= window_start && pause.start < window_end && pause.end >= window_end
        {
            duration -= seconds_between(pause.start, window_end);
        } else if pause.start > window_start && pause.end < window_end {
            duration -= seconds_between(pause.start, pause.end);
        }
    }

    duration.max(0.0)
}

/// Format a duration in seconds as zero-padded `HH:MM:SS.mmm`
pub fn format_elapsed(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as i64;
    let millis = total_millis % 1000;
    let secs = (total_millis / 1000) % 60;
    let minutes = (total_millis / 60_000) % 60;
    let hours = total_millis / 3_600_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Build distance splits from a sample stream.
///
/// Samples are processed in chronological order; each sample's quantity is
/// added to the running distance and its pause-adjusted duration to the
/// running time. A split is emitted whenever the running distance crosses
/// the next `split_distance` boundary, plus a trailing partial split for
/// any leftover distance.
pub fn build_splits(samples: &[Sample], pauses: &[PauseInterval], split_distance: f64) -> Vec<Split> {
    if samples.is_empty() || split_distance <= 0.0 {
        return Vec::new();
    }

    let mut ordered: Vec<&Sample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.start);

    let mut splits = Vec::new();
    let mut last_boundary = ordered[0].start;
    let mut split_length = 0.0;
    let mut split_secs = 0.0;

    for sample in ordered {
        split_length += sample.quantity;
        split_secs += adjusted_duration(pauses, sample, last_boundary);
        last_boundary = sample.end;

        while split_length >= split_distance {
            splits.push(Split {
                index: splits.len() + 1,
                distance: split_distance,
                duration_secs: split_secs,
            });
            split_length -= split_distance;
            split_secs = 0.0;
        }
    }

    if split_length > 0.0 {
        splits.push(Split {
            index: splits.len() + 1,
            distance: split_length,
            duration_secs: split_secs,
        });
    }

    splits
}
