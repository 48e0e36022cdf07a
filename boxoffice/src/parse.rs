//! Structural extraction of the daily box-office table
//!
//! This module only answers "what does the table say": column names and the
//! string cells of each row. Typing the cells is left to `normalize`.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{Error, Result};

/// Path marker preceding the ISO date in each row's link (`/date/2023-07-21/?ref_=...`)
const DATE_MARKER: &str = "/date/";

/// Header names plus data rows, cells still as scraped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// Date taken from the row's link target, not the locale-formatted cell text
    pub date_token: String,
    /// Cells for `columns[1..]`, in order
    pub cells: Vec<String>,
}

impl ParsedTable {
    /// Position of a named column within `ParsedRow::cells`
    pub fn cell_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().skip(1).position(|c| c == name)
    }
}

/// One way of turning raw input into a document the extractor can walk
pub trait TableStrategy {
    fn name(&self) -> &'static str;
    /// Cheap check on the raw input, run before any parsing
    fn accepts(&self, html: &str) -> bool;
    fn parse(&self, html: &str) -> Html;
}

/// Full HTML5 document parse, for complete pages
pub struct DocumentStrategy;

impl TableStrategy for DocumentStrategy {
    fn name(&self) -> &'static str {
        "document"
    }

    fn accepts(&self, html: &str) -> bool {
        html.to_ascii_lowercase().contains("<table")
    }

    fn parse(&self, html: &str) -> Html {
        Html::parse_document(html)
    }
}

/// Bare `<tr>` rows cut out of a page. The rows are wrapped in a table so the
/// HTML5 tree builder keeps them.
pub struct FragmentStrategy;

impl TableStrategy for FragmentStrategy {
    fn name(&self) -> &'static str {
        "fragment"
    }

    fn accepts(&self, html: &str) -> bool {
        html.to_ascii_lowercase().contains("<tr")
    }

    fn parse(&self, html: &str) -> Html {
        Html::parse_fragment(&format!("<table>{}</table>", html))
    }
}

/// Strategies tried in order by `parse_daily_table`
pub fn default_strategies() -> Vec<Box<dyn TableStrategy>> {
    vec![Box::new(DocumentStrategy), Box::new(FragmentStrategy)]
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector(format!("{}: {}", css, e)))
}

/// Concatenated text of an element, trimmed
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Extract the ISO date from a link like `/date/2023-07-21/?ref_=bo_rl_tab#tabs`
pub fn date_token_from_href(href: &str) -> Option<&str> {
    let (_, rest) = href.split_once(DATE_MARKER)?;
    let token = rest.split('/').next().unwrap_or(rest);
    Some(token.split(['?', '#']).next().unwrap_or(token))
}

pub fn parse_daily_table(html: &str) -> Result<ParsedTable> {
    parse_daily_table_with(&default_strategies(), html)
}

/// Try each accepting strategy in order; the first that finds header cells wins.
pub fn parse_daily_table_with(
    strategies: &[Box<dyn TableStrategy>],
    html: &str,
) -> Result<ParsedTable> {
    for strategy in strategies {
        if !strategy.accepts(html) {
            continue;
        }
        let document = strategy.parse(html);
        let table = extract_daily_table(&document)?;
        if table.columns.is_empty() {
            debug!(strategy = strategy.name(), "no header cells found");
            continue;
        }
        debug!(
            strategy = strategy.name(),
            columns = table.columns.len(),
            rows = table.rows.len(),
            "parsed daily table"
        );
        return Ok(table);
    }
    Err(Error::NoTable)
}

fn extract_daily_table(document: &Html) -> Result<ParsedTable> {
    let th = selector("th")?;
    let tr = selector("tr")?;
    let td = selector("td")?;
    let link = selector("a[href]")?;

    let columns: Vec<String> = document.select(&th).map(element_text).collect();
    let width = columns.len().saturating_sub(1);

    let mut rows = Vec::new();
    for (index, row) in document.select(&tr).skip(1).enumerate() {
        let date_token = row
            .select(&link)
            .filter_map(|a| a.value().attr("href"))
            .find_map(date_token_from_href)
            .unwrap_or_default()
            .to_string();

        let mut cells: Vec<String> = row.select(&td).skip(1).map(element_text).collect();

        // Short rows are padded (trailing columns such as "Estimated" are often
        // blank); long rows cannot be assigned to headers and are rejected.
        if cells.len() > width {
            return Err(Error::StructuralMismatch {
                row: index + 1,
                expected: columns.len(),
                found: cells.len() + 1,
            });
        }
        cells.resize(width, String::new());

        if date_token.is_empty() && cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(ParsedRow { date_token, cells });
    }

    Ok(ParsedTable { columns, rows })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Trimmed-down release page in the site's markup
    pub(crate) const RELEASE_PAGE: &str = r#"<!doctype html>
<html><head><title>Barbie - Box Office Mojo</title></head>
<body>
<div class="a-section">
<table class="a-bordered a-horizontal-stripes mojo-table">
<tr>
  <th>Date</th><th>DOW</th><th>Rank</th><th>Daily</th><th>Theaters</th>
  <th>Avg</th><th>To Date</th><th>Day</th><th>Estimated</th>
</tr>
<tr>
  <td><a class="a-link-normal" href="/date/2023-07-21/?ref_=bo_rl_table_1">Jul 21</a></td>
  <td>Friday</td><td>1</td><td>$70,503,889</td><td>4,243</td>
  <td>$16,616</td><td>$70,503,889</td><td>1</td><td>false</td>
</tr>
<tr>
  <td><a class="a-link-normal" href="/date/2023-07-22/?ref_=bo_rl_table_2">Jul 22</a></td>
  <td>Saturday</td><td>1</td><td>$47,094,101</td><td>4,243</td>
  <td>$11,099</td><td>$117,597,990</td><td>2</td><td>false</td>
</tr>
<tr>
  <td><a class="a-link-normal" href="/date/2023-07-23/?ref_=bo_rl_table_3">Jul 23</a></td>
  <td>Sunday</td><td>1</td><td>$44,406,327</td><td>4,243</td>
  <td>$10,465</td><td>$162,004,317</td><td>3</td>
</tr>
<tr><td></td></tr>
</table>
</div>
</body></html>"#;

    #[test]
    fn test_date_token_from_href() {
        assert_eq!(
            date_token_from_href("/date/2023-07-21/?ref_=bo_rl_table_1"),
            Some("2023-07-21")
        );
        assert_eq!(date_token_from_href("/date/2023-07-21"), Some("2023-07-21"));
        assert_eq!(date_token_from_href("/date/2023-07-21?x=1"), Some("2023-07-21"));
        assert_eq!(date_token_from_href("/release/rl1077904129/"), None);
    }

    #[test]
    fn test_parse_release_page() {
        let table = parse_daily_table(RELEASE_PAGE).unwrap();
        assert_eq!(table.columns[0], "Date");
        assert_eq!(table.columns.len(), 9);
        assert_eq!(table.rows.len(), 3);

        let first = &table.rows[0];
        assert_eq!(first.date_token, "2023-07-21");
        assert_eq!(first.cells[0], "Friday");
        let daily = table.cell_index("Daily").unwrap();
        assert_eq!(first.cells[daily], "$70,503,889");
    }

    #[test]
    fn test_short_row_is_padded() {
        let table = parse_daily_table(RELEASE_PAGE).unwrap();
        let third = &table.rows[2];
        assert_eq!(third.cells.len(), 8);
        let estimated = table.cell_index("Estimated").unwrap();
        assert_eq!(third.cells[estimated], "");
    }

    #[test]
    fn test_long_row_is_rejected() {
        let html = r#"<table>
            <tr><th>Date</th><th>Daily</th></tr>
            <tr><td><a href="/date/2023-07-21/">Jul 21</a></td><td>$1</td><td>extra</td></tr>
        </table>"#;
        match parse_daily_table(html) {
            Err(Error::StructuralMismatch { row, expected, found }) => {
                assert_eq!((row, expected, found), (1, 2, 3));
            }
            other => panic!("expected StructuralMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_fragment_rows_without_table() {
        let html = r#"<tr><th>Date</th><th>Daily</th></tr>
            <tr><td><a href="/date/2023-07-21/">Jul 21</a></td><td>$10</td></tr>"#;
        assert!(!DocumentStrategy.accepts(html));
        assert!(FragmentStrategy.accepts(html));
        let table = parse_daily_table(html).unwrap();
        assert_eq!(table.columns, vec!["Date", "Daily"]);
        assert_eq!(table.rows[0].date_token, "2023-07-21");
        assert_eq!(table.rows[0].cells, vec!["$10"]);
    }

    #[test]
    fn test_no_table() {
        assert!(matches!(
            parse_daily_table("<html><body><p>Service Unavailable</p></body></html>"),
            Err(Error::NoTable)
        ));
    }
}
