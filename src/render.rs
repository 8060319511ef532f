//! CSV rendering for export records
//!
//! Pure, deterministic rendering: the same records always produce
//! byte-identical output. Each kind has a fixed header; every data row has
//! exactly the header's column count, with missing quantities rendered as
//! documented defaults instead of being omitted. Headers must never change
//! incompatibly — remote consumers parse files exported years apart.

use crate::types::{ActivitySummary, DistanceDayEntry, Workout};

/// Header line for workout files
pub const WORKOUTS_HEADER: &str =
    "Start,End,Activity Type,Duration,Total Distance,Elevation Ascended,Total Energy Burned,Source";

/// Header line for activity summary files
pub const ACTIVITY_HEADER: &str =
    "Date,Move Actual,Move Goal,Exercise Actual,Exercise Goal,Stand Actual,Stand Goal";

/// Header line for distance files
pub const DISTANCES_HEADER: &str =
    "Date,Distance Walking/Running,Steps,Distance Swimming,Strokes,Distance Cycling,Distance Wheelchair,Elevation Descended";

/// Render a float quantity as fixed two-decimal text; missing values
/// render as `0.00`.
pub fn format_quantity(value: Option<f64>) -> String {
    format!("{:.2}", value.unwrap_or(0.0))
}

/// Render an integer-only quantity (steps, strokes, hours) with no
/// decimals; missing values render as `0`.
pub fn format_count(value: Option<f64>) -> String {
    format!("{:.0}", value.unwrap_or(0.0))
}

/// Render one year's workouts as CSV.
///
/// Rows are sorted chronologically ascending by start time (stable for
/// ties). Elevation is the one optional column that renders a bare `0`
/// when absent, distinguishing "not recorded" from a measured zero.
pub fn render_workouts(workouts: &[Workout]) -> String {
    let mut rows: Vec<&Workout> = workouts.iter().collect();
    rows.sort_by_key(|w| w.start);

    let mut content = String::from(WORKOUTS_HEADER);
    content.push('\n');

    for workout in rows {
        let elevation = match workout.elevation_ascended {
            Some(meters) => format!("{:.2}", meters),
            None => "0".to_string(),
        };
        content.push_str(&format!(
            "{},{},{},{:.2},{},{},{},{}\n",
            workout.start.format("%Y-%m-%d %H:%M:%S %:z"),
            workout.end.format("%Y-%m-%d %H:%M:%S %:z"),
            workout.activity_type.name(),
            workout.duration_secs,
            format_quantity(workout.total_distance),
            elevation,
            format_quantity(workout.total_energy_burned),
            sanitize_field(&workout.source),
        ));
    }

    content
}

/// Render one year's activity summaries as CSV, sorted by date.
pub fn render_activity(summaries: &[ActivitySummary]) -> String {
    let mut rows: Vec<&ActivitySummary> = summaries.iter().collect();
    rows.sort_by_key(|s| s.date);

    let mut content = String::from(ACTIVITY_HEADER);
    content.push('\n');

    for summary in rows {
        content.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            summary.date.format("%Y-%m-%d"),
            format_quantity(summary.move_actual),
            format_quantity(summary.move_goal),
            format_count(summary.exercise_actual),
            format_count(summary.exercise_goal),
            format_count(summary.stand_actual),
            format_count(summary.stand_goal),
        ));
    }

    content
}

/// Render one year's distance day entries as CSV, sorted by date.
pub fn render_distances(entries: &[DistanceDayEntry]) -> String {
    let mut rows: Vec<&DistanceDayEntry> = entries.iter().collect();
    rows.sort_by_key(|e| e.date);

    let mut content = String::from(DISTANCES_HEADER);
    content.push('\n');

    for entry in rows {
        content.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            entry.date.format("%Y-%m-%d"),
            format_quantity(entry.walking_running),
            format_count(entry.steps),
            format_quantity(entry.swimming),
            format_count(entry.strokes),
            format_quantity(entry.cycling),
            format_quantity(entry.wheelchair),
            format_quantity(entry.elevation_descended),
        ));
    }

    content
}

/// Field values must not introduce extra columns; rows always have exactly
/// the header's column count.
fn sanitize_field(value: &str) -> String {
    value.replace([',', '\n', '\r'], " ")
}
