//! Year bucketing for export records
//!
//! Groups an arbitrary list of dated records into per-year buckets. One
//! remote file is written per bucket, so bucket iteration order (numeric
//! ascending via `BTreeMap`) is the order files are synced in.

use std::collections::BTreeMap;

use crate::types::Year;

/// Result of partitioning records by calendar year
#[derive(Clone, Debug)]
pub struct YearBuckets<T> {
    /// Records grouped by year, relative input order preserved per bucket
    pub buckets: BTreeMap<Year, Vec<T>>,
    /// Number of records excluded because no year could be derived
    pub skipped: usize,
}

impl<T> YearBuckets<T> {
    /// Total number of records across all buckets
    pub fn record_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether the partition holds no records at all
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Partition records into per-year buckets.
///
/// `year_of` derives the bucketing key from a record; returning `None`
/// excludes the record (counted in [`YearBuckets::skipped`]) without
/// disturbing any other bucket. Every record with a year lands in exactly
/// one bucket, preserving its relative input order.
pub fn partition_by_year<T, F>(records: impl IntoIterator<Item = T>, year_of: F) -> YearBuckets<T>
where
    F: Fn(&T) -> Option<Year>,
{
    let mut buckets: BTreeMap<Year, Vec<T>> = BTreeMap::new();
    let mut skipped = 0;

    for record in records {
        match year_of(&record) {
            Some(year) => buckets.entry(year).or_default().push(record),
            None => skipped += 1,
        }
    }

    YearBuckets { buckets, skipped }
}
