//! Cache-or-fetch access to daily sales tables and the yearly catalog

use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{identifier_pairs, parse_listing, CatalogStore};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::memo::TableCache;
use crate::normalize::normalize;
use crate::parse::parse_daily_table;
use crate::registry::{release_url, year_url, IdentifierRegistry};
use crate::store::PageStore;
use crate::types::{DailySalesTable, MovieId};

/// Outcome of `refresh_catalog`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    pub years_fetched: Vec<i32>,
    pub years_skipped: usize,
    pub releases: usize,
    /// Titles the registry did not know before the refresh
    pub titles_added: usize,
}

/// Per-title results of `daily_sales_many`, in request order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<(String, Result<Arc<DailySalesTable>>)>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.results
            .iter()
            .filter_map(|(title, r)| r.as_ref().err().map(|e| (title.as_str(), e)))
    }
}

pub struct SalesRetriever<F = HttpFetcher> {
    config: Config,
    registry: IdentifierRegistry,
    fetcher: F,
    pages: PageStore,
    catalog: CatalogStore,
    tables: TableCache,
}

impl SalesRetriever<HttpFetcher> {
    /// Seeded registry, HTTP fetcher built from `config`
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeout)?;
        Ok(Self::with_fetcher(config, IdentifierRegistry::with_seed(), fetcher))
    }
}

impl<F: Fetch> SalesRetriever<F> {
    pub fn with_fetcher(config: Config, registry: IdentifierRegistry, fetcher: F) -> Self {
        Self {
            pages: PageStore::new(config.titles_dir()),
            catalog: CatalogStore::new(config.catalog_dir()),
            tables: TableCache::new(config.cache_capacity),
            config,
            registry,
            fetcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn known_titles(&self) -> &[String] {
        self.registry.list_known_titles()
    }

    /// Merge title/identifier pairs; existing titles are overwritten
    pub fn register_many<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (String, MovieId)>,
    {
        self.registry.register_many(pairs)
    }

    /// Daily sales for `title`.
    ///
    /// Without `force_refresh`, a page already on disk is never refetched and
    /// a table already built in this process is returned as is, even if the
    /// page on disk has changed since.
    pub fn daily_sales(&mut self, title: &str, force_refresh: bool) -> Result<Arc<DailySalesTable>> {
        let id = self.registry.resolve(title)?.clone();

        if force_refresh || !self.pages.exists(&id) {
            let url = release_url(&self.config.base_url, &id);
            let html = self.fetcher.fetch(&url)?;
            self.pages.save(&id, &html)?;
            return self.build_table(title, id, &html);
        }

        if let Some(table) = self.tables.get(title) {
            debug!(title, "table served from memory");
            return Ok(table);
        }

        let page = self.pages.load(&id)?;
        self.build_table(title, page.movie_id, &page.html)
    }

    fn build_table(&mut self, title: &str, id: MovieId, html: &str) -> Result<Arc<DailySalesTable>> {
        let parsed = parse_daily_table(html)?;
        let table = Arc::new(normalize(id, &parsed)?);
        self.tables.insert(title, Arc::clone(&table));
        Ok(table)
    }

    /// Fetch many titles, one result per title. A failure never stops the
    /// batch and leaves other titles' cached state alone.
    pub fn daily_sales_many<I, S>(&mut self, titles: I, force_refresh: bool) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BatchReport::default();
        for title in titles {
            let title = title.as_ref();
            let result = self.daily_sales(title, force_refresh);
            if let Err(e) = &result {
                debug!(title, error = %e, "batch item failed");
            }
            report.results.push((title.to_string(), result));
        }
        report
    }

    /// Download missing yearly listings, rebuild the history file and merge
    /// its identifiers into the registry.
    pub fn refresh_catalog(&mut self) -> Result<CatalogReport> {
        let mut report = CatalogReport::default();
        let years: Vec<i32> = self.config.years().collect();

        for year in years {
            if self.catalog.has_year(year) {
                debug!(year, "year listing already downloaded");
                report.years_skipped += 1;
                continue;
            }
            let url = year_url(&self.config.base_url, year);
            let html = self.fetcher.fetch(&url)?;
            let rows = parse_listing(&html)?;
            self.catalog.save_year(year, &rows)?;
            report.years_fetched.push(year);
        }

        let records = self.catalog.consolidate()?;
        report.releases = records.len();
        report.titles_added = self.registry.register_many(identifier_pairs(&records));
        info!(
            fetched = report.years_fetched.len(),
            skipped = report.years_skipped,
            releases = report.releases,
            titles_added = report.titles_added,
            "catalog refreshed"
        );
        Ok(report)
    }

    /// Merge identifiers from a previously written history file, if any.
    /// Returns how many titles were new.
    pub fn load_catalog(&mut self) -> Result<usize> {
        match self.catalog.load_historical()? {
            Some(records) => Ok(self.registry.register_many(identifier_pairs(&records))),
            None => Ok(0),
        }
    }
}
