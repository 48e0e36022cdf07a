use std::collections::BTreeMap;

use crate::types::{DailySalesRecord, DailySalesTable};

/// Two releases side by side on the same day of their runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub day: u32,
    pub a_daily: Option<u64>,
    pub b_daily: Option<u64>,
    pub a_total: Option<u64>,
    pub b_total: Option<u64>,
}

/// Align two tables by day number. Days only one release reported leave the
/// other side empty.
pub fn compare(a: &DailySalesTable, b: &DailySalesTable) -> Vec<ComparisonRow> {
    let mut days: BTreeMap<u32, (Option<&DailySalesRecord>, Option<&DailySalesRecord>)> =
        BTreeMap::new();
    for record in a.records() {
        days.entry(record.day_number).or_default().0 = Some(record);
    }
    for record in b.records() {
        days.entry(record.day_number).or_default().1 = Some(record);
    }

    days.into_iter()
        .map(|(day, (ra, rb))| ComparisonRow {
            day,
            a_daily: ra.map(|r| r.daily_gross),
            b_daily: rb.map(|r| r.daily_gross),
            a_total: ra.map(|r| r.running_total),
            b_total: rb.map(|r| r.running_total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MovieId;
    use chrono::NaiveDate;

    fn table(id: &str, start_day: u32, grosses: &[u64]) -> DailySalesTable {
        let mut total = 0;
        let records = grosses
            .iter()
            .enumerate()
            .map(|(i, &gross)| {
                total += gross;
                DailySalesRecord {
                    date: NaiveDate::from_ymd_opt(2023, 7, 1 + i as u32).unwrap(),
                    daily_gross: gross,
                    average_per_theater: 0,
                    theater_count: 1,
                    day_number: start_day + i as u32,
                    running_total: total,
                }
            })
            .collect();
        DailySalesTable::new(MovieId::from(id), records)
    }

    #[test]
    fn test_aligns_by_day_number() {
        let barbie = table("1", 1, &[70, 47, 44]);
        let oppenheimer = table("2", 2, &[28, 22]);

        let rows = compare(&barbie, &oppenheimer);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].day, 1);
        assert_eq!(rows[0].b_daily, None);
        assert_eq!(rows[1].a_total, Some(117));
        assert_eq!(rows[1].b_total, Some(28));
        assert_eq!(rows[2].b_total, Some(50));
    }
}
