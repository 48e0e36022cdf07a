//! Films-by-year listing: per-year CSV snapshots and the consolidated history

use chrono::NaiveDate;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::normalize::parse_currency;
use crate::parse::{element_text, selector};
use crate::registry::extract_release_ids;
use crate::types::{MovieId, YearlyReleaseRecord};

pub const HISTORICAL_FILE: &str = "historical_releases.csv";
const YEAR_FILE_PREFIX: &str = "movies_";

const RELEASE_COLUMN: &str = "Release";
const GROSS_COLUMN: &str = "Gross";
const TOTAL_GROSS_COLUMN: &str = "Total Gross";
const RELEASE_DATE_COLUMN: &str = "Release Date";

/// A yearly listing row exactly as scraped, plus the resolved identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRow {
    #[serde(rename = "Rank", default)]
    pub rank: String,
    #[serde(rename = "Release")]
    pub release: String,
    #[serde(rename = "Gross")]
    pub gross: String,
    #[serde(rename = "Theaters", default)]
    pub theaters: String,
    #[serde(rename = "Total Gross")]
    pub total_gross: String,
    #[serde(rename = "Release Date")]
    pub release_date: String,
    #[serde(rename = "Distributor", default)]
    pub distributor: String,
    pub movie_id: Option<MovieId>,
}

impl ListingRow {
    /// Typed record for `year`; the listing shows release dates without a year
    pub fn normalize(&self, year: i32) -> Result<YearlyReleaseRecord> {
        let release_date = NaiveDate::parse_from_str(
            &format!("{} {}", self.release_date.trim(), year),
            "%b %d %Y",
        )
        .ok();
        let distributor = Some(self.distributor.trim())
            .filter(|d| !d.is_empty() && *d != "-")
            .map(str::to_string);

        Ok(YearlyReleaseRecord {
            year,
            title: self.release.clone(),
            release_date,
            gross: parse_currency(&self.gross)?,
            total_gross: parse_currency(&self.total_gross)?,
            distributor,
            movie_id: self.movie_id.clone(),
        })
    }
}

/// Rows of the first table on a yearly listing page, identifiers attached by
/// title from the page's release links.
pub fn parse_listing(html: &str) -> Result<Vec<ListingRow>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let th = selector("th")?;
    let tr = selector("tr")?;
    let td = selector("td")?;

    let table = document.select(&table_sel).next().ok_or(Error::NoTable)?;
    let columns: Vec<String> = table.select(&th).map(element_text).collect();
    let index_of = |name: &str| columns.iter().position(|c| c == name);
    let required = |name: &str| index_of(name).ok_or_else(|| Error::MissingColumn(name.to_string()));

    let release = required(RELEASE_COLUMN)?;
    let gross = required(GROSS_COLUMN)?;
    let total_gross = required(TOTAL_GROSS_COLUMN)?;
    let release_date = required(RELEASE_DATE_COLUMN)?;
    let rank = index_of("Rank");
    let theaters = index_of("Theaters");
    let distributor = index_of("Distributor");

    // Later links for a repeated title win, as in the registry
    let ids: HashMap<String, MovieId> = extract_release_ids(html)?.into_iter().collect();

    let mut rows = Vec::new();
    for (index, row) in table.select(&tr).skip(1).enumerate() {
        let cells: Vec<String> = row.select(&td).map(element_text).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        if cells.len() > columns.len() {
            return Err(Error::StructuralMismatch {
                row: index + 1,
                expected: columns.len(),
                found: cells.len(),
            });
        }
        let cell = |i: Option<usize>| {
            i.and_then(|i| cells.get(i))
                .cloned()
                .unwrap_or_default()
        };

        let title = cell(Some(release));
        if title.is_empty() {
            continue;
        }
        rows.push(ListingRow {
            rank: cell(rank),
            movie_id: ids.get(&title).cloned(),
            release: title,
            gross: cell(Some(gross)),
            theaters: cell(theaters),
            total_gross: cell(Some(total_gross)),
            release_date: cell(Some(release_date)),
            distributor: cell(distributor),
        });
    }
    Ok(rows)
}

/// Directory holding `movies_{year}.csv` files and the consolidated history
#[derive(Debug, Clone)]
pub struct CatalogStore {
    dir: PathBuf,
}

impl CatalogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn year_path(&self, year: i32) -> PathBuf {
        self.dir.join(format!("{}{}.csv", YEAR_FILE_PREFIX, year))
    }

    pub fn historical_path(&self) -> PathBuf {
        self.dir.join(HISTORICAL_FILE)
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.year_path(year).is_file()
    }

    pub fn save_year(&self, year: i32, rows: &[ListingRow]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.year_path(year);
        write_csv(&path, rows)?;
        info!(year, rows = rows.len(), path = %path.display(), "year listing saved");
        Ok(path)
    }

    pub fn load_year(&self, year: i32) -> Result<Vec<ListingRow>> {
        read_csv(&self.year_path(year))
    }

    /// Years with a listing file on disk, in no particular order
    pub fn saved_years(&self) -> Result<Vec<i32>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut years = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            let year = name
                .strip_prefix(YEAR_FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(".csv"))
                .and_then(|y| y.parse::<i32>().ok());
            if let Some(year) = year {
                years.push(year);
            }
        }
        Ok(years)
    }

    /// Reload every year file, normalize, sort by year then gross (both
    /// descending) and write the historical file.
    pub fn consolidate(&self) -> Result<Vec<YearlyReleaseRecord>> {
        let mut records = Vec::new();
        for year in self.saved_years()? {
            let rows = self.load_year(year)?;
            debug!(year, rows = rows.len(), "consolidating year");
            for row in &rows {
                records.push(row.normalize(year)?);
            }
        }
        records.sort_by(|a, b| b.year.cmp(&a.year).then(b.gross.cmp(&a.gross)));

        fs::create_dir_all(&self.dir)?;
        write_csv(&self.historical_path(), &records)?;
        info!(releases = records.len(), path = %self.historical_path().display(), "history written");
        Ok(records)
    }

    pub fn load_historical(&self) -> Result<Option<Vec<YearlyReleaseRecord>>> {
        let path = self.historical_path();
        if !path.is_file() {
            return Ok(None);
        }
        read_csv(&path).map(Some)
    }
}

/// Title/identifier pairs to merge into the registry, in record order
pub fn identifier_pairs(records: &[YearlyReleaseRecord]) -> Vec<(String, MovieId)> {
    records
        .iter()
        .filter_map(|r| Some((r.title.clone(), r.movie_id.clone()?)))
        .collect()
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(rows)
}
