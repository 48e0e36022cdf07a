use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BASE_URL: &str = "https://www.boxofficemojo.com";
pub const DATA_DIR: &str = "_data_cache";
pub const TITLES_SUBDIR: &str = "titles";
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; BoxOfficeSales/0.1)";
/// Catalog years run from FIRST_YEAR down to LAST_YEAR, inclusive
pub const FIRST_YEAR: i32 = 2023;
pub const LAST_YEAR: i32 = 1992;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub data_dir: PathBuf,
    pub user_agent: String,
    /// No timeout when `None`
    pub timeout: Option<Duration>,
    pub first_year: i32,
    pub last_year: i32,
    /// Unbounded when `None`; `Some(0)` disables the memory cache
    pub cache_capacity: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            data_dir: PathBuf::from(DATA_DIR),
            user_agent: USER_AGENT.to_string(),
            timeout: None,
            first_year: FIRST_YEAR,
            last_year: LAST_YEAR,
            cache_capacity: None,
        }
    }
}

impl Config {
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn titles_dir(&self) -> PathBuf {
        self.data_dir.join(TITLES_SUBDIR)
    }

    pub fn catalog_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Catalog years, most recent first
    pub fn years(&self) -> impl Iterator<Item = i32> {
        let (hi, lo) = if self.first_year >= self.last_year {
            (self.first_year, self.last_year)
        } else {
            (self.last_year, self.first_year)
        };
        (lo..=hi).rev()
    }
}
