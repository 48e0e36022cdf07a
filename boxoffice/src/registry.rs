//! Title → release identifier index

use scraper::Html;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::parse::{element_text, selector};
use crate::types::MovieId;

const RELEASE_MARKER: &str = "/release/rl";
const RELEASE_REF: &str = "?ref_=bo_tt_gr_1";
const YEAR_REF: &str = "?ref_=bo_hm_yrdom";

/// Releases known without any catalog refresh
const SEED: &[(&str, &str)] = &[("Barbie", "1077904129"), ("Oppenheimer", "3725886209")];

/// Titles are not unique across years; the last registration for a title wins.
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    ids: HashMap<String, MovieId>,
    /// First-registration order, for listing
    titles: Vec<String>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed() -> Self {
        let mut registry = Self::new();
        registry.register_many(SEED.iter().map(|(title, id)| (title.to_string(), MovieId::from(*id))));
        registry
    }

    pub fn resolve(&self, title: &str) -> Result<&MovieId> {
        self.ids
            .get(title)
            .ok_or_else(|| Error::UnknownTitle(title.to_string()))
    }

    /// Returns the identifier previously held by `title`, if any
    pub fn register(&mut self, title: impl Into<String>, id: MovieId) -> Option<MovieId> {
        let title = title.into();
        let previous = self.ids.insert(title.clone(), id);
        if previous.is_none() {
            self.titles.push(title);
        }
        previous
    }

    /// Merge pairs in order, overwriting existing titles. Returns how many
    /// titles were new.
    pub fn register_many<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (String, MovieId)>,
    {
        let mut added = 0;
        for (title, id) in pairs {
            if self.register(title, id).is_none() {
                added += 1;
            }
        }
        added
    }

    pub fn list_known_titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// `{base}/release/rl{id}/?ref_=...`
pub fn release_url(base: &str, id: &MovieId) -> String {
    format!("{}{}{}/{}", base.trim_end_matches('/'), RELEASE_MARKER, id, RELEASE_REF)
}

/// `{base}/year/{year}/?ref_=...`
pub fn year_url(base: &str, year: i32) -> String {
    format!("{}/year/{}/{}", base.trim_end_matches('/'), year, YEAR_REF)
}

/// Identifier from a link like `/release/rl1077904129/?ref_=bo_yld_table_1`
pub fn id_from_href(href: &str) -> Option<MovieId> {
    let (_, rest) = href.split_once(RELEASE_MARKER)?;
    let id = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    if id.is_empty() {
        return None;
    }
    Some(MovieId::from(id))
}

/// Title/identifier pairs from the release links of a yearly listing page, in
/// page order.
pub fn extract_release_ids(html: &str) -> Result<Vec<(String, MovieId)>> {
    let document = Html::parse_document(html);
    let link = selector("td.mojo-field-type-release a[href]")?;

    Ok(document
        .select(&link)
        .filter_map(|a| {
            let id = id_from_href(a.value().attr("href")?)?;
            Some((element_text(a), id))
        })
        .filter(|(title, _)| !title.is_empty())
        .collect())
}
