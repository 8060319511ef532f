//! Per-day distance entry synthesis
//!
//! Distance metrics arrive as sparse per-metric series (one value per day
//! a measurement exists). The export wants one row per calendar day, so
//! this module expands the series over a date range, filling gaps with
//! empty entries that render as documented defaults.
//!
//! Leading days of past years with no step data are skipped so that a
//! user's first tracked day, not an arbitrary range start, opens the
//! history. Days in the current year are always included, even without
//! steps, so the current file keeps growing day by day.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::types::DistanceDayEntry;

/// Sparse per-metric daily series, keyed by calendar day
#[derive(Clone, Debug, Default)]
pub struct DistanceSeries {
    /// Walking/running distance in meters per day
    pub walking_running: HashMap<NaiveDate, f64>,
    /// Step counts per day
    pub steps: HashMap<NaiveDate, f64>,
    /// Swimming distance in meters per day
    pub swimming: HashMap<NaiveDate, f64>,
    /// Stroke counts per day
    pub strokes: HashMap<NaiveDate, f64>,
    /// Cycling distance in meters per day
    pub cycling: HashMap<NaiveDate, f64>,
    /// Wheelchair distance in meters per day
    pub wheelchair: HashMap<NaiveDate, f64>,
    /// Elevation descended in meters per day
    pub elevation_descended: HashMap<NaiveDate, f64>,
}

impl DistanceSeries {
    fn entry_for(&self, date: NaiveDate) -> DistanceDayEntry {
        DistanceDayEntry {
            date,
            walking_running: self.walking_running.get(&date).copied(),
            steps: self.steps.get(&date).copied(),
            swimming: self.swimming.get(&date).copied(),
            strokes: self.strokes.get(&date).copied(),
            cycling: self.cycling.get(&date).copied(),
            wheelchair: self.wheelchair.get(&date).copied(),
            elevation_descended: self.elevation_descended.get(&date).copied(),
        }
    }
}

/// Expand sparse series into one entry per day in `[start, end]`.
///
/// `today` anchors the current-year rule: days in `today`'s year are
/// always included, while leading days of earlier years are dropped until
/// the first day with a step entry.
pub fn day_entries(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    series: &DistanceSeries,
) -> Vec<DistanceDayEntry> {
    let mut entries = Vec::new();
    let mut seen_steps = false;

    for day in start.iter_days().take_while(|day| *day <= end) {
        if series.steps.contains_key(&day) {
            seen_steps = true;
        }

        if seen_steps || day.year() == today.year() {
            entries.push(series.entry_for(day));
        }
    }

    entries
}
