use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the retrieval path.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown title '{0}'")]
    UnknownTitle(String),
    #[error("request to {url} failed: {source}")]
    Connectivity {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("informational response (status code {0})")]
    InformationalResponse(u16),
    #[error("redirect not followed (status code {0})")]
    RedirectNotFollowed(u16),
    #[error("client error (status code {0})")]
    ClientError(u16),
    #[error("server error (status code {0})")]
    ServerError(u16),
    #[error("no cached page at {}", .0.display())]
    NotFound(PathBuf),
    #[error("malformed currency value '{0}'")]
    MalformedCurrency(String),
    #[error("malformed number '{0}'")]
    MalformedNumber(String),
    #[error("malformed date token '{0}'")]
    MalformedDate(String),
    #[error("table has no '{0}' column")]
    MissingColumn(String),
    #[error("row {row} has {found} cells, expected at most {expected}")]
    StructuralMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid CSS selector '{0}'")]
    Selector(String),
    #[error("no table found in page")]
    NoTable,
    #[error("day {day} breaks date ordering: {reason}")]
    OutOfOrder { day: u32, reason: &'static str },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
