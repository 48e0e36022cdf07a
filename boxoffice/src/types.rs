//! Box-office record types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque release identifier issued by the site (the digits after `/release/rl`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MovieId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Fetched or cached HTML for one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub movie_id: MovieId,
    pub html: String,
}

/// One day of a release's run. Money is in whole dollars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySalesRecord {
    pub date: NaiveDate,
    pub daily_gross: u64,
    pub average_per_theater: u64,
    pub theater_count: u64,
    /// Days since release, starting at 1
    pub day_number: u32,
    pub running_total: u64,
}

/// Daily records for one release, ascending by date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySalesTable {
    pub movie_id: MovieId,
    records: Vec<DailySalesRecord>,
}

impl DailySalesTable {
    pub(crate) fn new(movie_id: MovieId, records: Vec<DailySalesRecord>) -> Self {
        Self { movie_id, records }
    }

    pub fn records(&self) -> &[DailySalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Running total as of the last reported day
    pub fn total_gross(&self) -> u64 {
        self.records.last().map(|r| r.running_total).unwrap_or(0)
    }

    /// Day with the highest daily gross (earliest wins a tie)
    pub fn peak_day(&self) -> Option<&DailySalesRecord> {
        self.records
            .iter()
            .rev()
            .max_by_key(|r| r.daily_gross)
    }
}

/// One release from a yearly listing page, after normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyReleaseRecord {
    pub year: i32,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    /// Gross earned within `year`
    pub gross: u64,
    pub total_gross: u64,
    pub distributor: Option<String>,
    pub movie_id: Option<MovieId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, daily: u64, total: u64) -> DailySalesRecord {
        DailySalesRecord {
            date: NaiveDate::from_ymd_opt(2023, 7, 20 + day).unwrap(),
            daily_gross: daily,
            average_per_theater: daily / 4000,
            theater_count: 4000,
            day_number: day,
            running_total: total,
        }
    }

    #[test]
    fn test_total_and_peak() {
        let table = DailySalesTable::new(
            MovieId::from("1077904129"),
            vec![record(1, 70, 70), record(2, 47, 117), record(3, 70, 187)],
        );
        assert_eq!(table.total_gross(), 187);
        assert_eq!(table.peak_day().map(|r| r.day_number), Some(1));
    }

    #[test]
    fn test_empty_table() {
        let table = DailySalesTable::new(MovieId::from("1"), Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.total_gross(), 0);
        assert!(table.peak_day().is_none());
    }
}
