//! Typing of scraped cells: dates, dollar amounts and counts

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::parse::{ParsedRow, ParsedTable};
use crate::types::{DailySalesRecord, DailySalesTable, MovieId};

pub const DAILY_COLUMN: &str = "Daily";
pub const AVERAGE_COLUMN: &str = "Avg";
pub const THEATERS_COLUMN: &str = "Theaters";
pub const TO_DATE_COLUMN: &str = "To Date";
pub const DAY_COLUMN: &str = "Day";

/// Year-first formats accepted for date tokens
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

fn strip_money(s: &str) -> String {
    s.trim().replace(['$', ','], "")
}

/// Parse "$1,234,567" to 1234567
pub fn parse_currency(s: &str) -> Result<u64> {
    let digits = strip_money(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedCurrency(s.to_string()));
    }
    digits
        .parse()
        .map_err(|_| Error::MalformedCurrency(s.to_string()))
}

/// Parse a plain count such as "4,243". Stray `$` and `,` are tolerated.
pub fn parse_count<T: std::str::FromStr>(s: &str) -> Result<T> {
    let digits = strip_money(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedNumber(s.to_string()));
    }
    digits
        .parse()
        .map_err(|_| Error::MalformedNumber(s.to_string()))
}

pub fn parse_date_token(token: &str) -> Result<NaiveDate> {
    let token = token.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
        .ok_or_else(|| Error::MalformedDate(token.to_string()))
}

fn cell(row: &ParsedRow, index: usize) -> &str {
    row.cells.get(index).map(String::as_str).unwrap_or("")
}

fn column(table: &ParsedTable, name: &str) -> Result<usize> {
    table
        .cell_index(name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

/// Convert a parsed daily table into typed records, keeping source order.
pub fn normalize(movie_id: MovieId, table: &ParsedTable) -> Result<DailySalesTable> {
    let daily = column(table, DAILY_COLUMN)?;
    let average = column(table, AVERAGE_COLUMN)?;
    let theaters = column(table, THEATERS_COLUMN)?;
    let to_date = column(table, TO_DATE_COLUMN)?;
    let day = column(table, DAY_COLUMN)?;

    let records = table
        .rows
        .iter()
        .map(|row| {
            Ok(DailySalesRecord {
                date: parse_date_token(&row.date_token)?,
                daily_gross: parse_currency(cell(row, daily))?,
                average_per_theater: parse_currency(cell(row, average))?,
                theater_count: parse_count(cell(row, theaters))?,
                day_number: parse_count(cell(row, day))?,
                running_total: parse_currency(cell(row, to_date))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    check_ordering(&records)?;
    Ok(DailySalesTable::new(movie_id, records))
}

/// Day numbers start at 1 and strictly increase; running totals never decrease.
pub fn check_ordering(records: &[DailySalesRecord]) -> Result<()> {
    if let Some(first) = records.first() {
        if first.day_number == 0 {
            return Err(Error::OutOfOrder {
                day: 0,
                reason: "day numbers start at 1",
            });
        }
    }
    for pair in records.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.day_number <= prev.day_number {
            return Err(Error::OutOfOrder {
                day: next.day_number,
                reason: "day number did not increase",
            });
        }
        if next.date <= prev.date {
            return Err(Error::OutOfOrder {
                day: next.day_number,
                reason: "date did not increase",
            });
        }
        if next.running_total < prev.running_total {
            return Err(Error::OutOfOrder {
                day: next.day_number,
                reason: "running total decreased",
            });
        }
    }
    Ok(())
}
