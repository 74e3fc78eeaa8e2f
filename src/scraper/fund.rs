use crate::error::FetchError;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Everything before this token in the page title is the fund name.
const TITLE_MARKER: &str = "Overview";
const NAME_WORDS: usize = 4;
const YIELD_LABEL: &str = "Dividend Yield";

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static TABLE: LazyLock<Selector> = LazyLock::new(|| selector(super::MEASURES_TABLE));
static BODY_ROWS: LazyLock<Selector> = LazyLock::new(|| selector("tbody tr"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css}: {e}"))
}

/// What a rendered fund page yielded. `error` is set whenever `raw_yield` is
/// missing; `name` is reported either way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub name: Option<String>,
    pub raw_yield: Option<String>,
    pub error: Option<FetchError>,
}

pub struct FundPageScraper<'a> {
    document: &'a Html,
}

impl<'a> FundPageScraper<'a> {
    pub(crate) fn new(document: &'a Html) -> Self {
        Self { document }
    }

    pub fn extract(&self) -> Extraction {
        let name = self.extract_name();

        let Some(table) = self.document.select(&TABLE).next() else {
            return Extraction {
                name,
                raw_yield: None,
                error: Some(FetchError::TableNotFound),
            };
        };

        match Self::extract_raw_yield(table) {
            Some(raw_yield) => Extraction {
                name,
                raw_yield: Some(raw_yield),
                error: None,
            },
            None => Extraction {
                name,
                raw_yield: None,
                error: Some(FetchError::YieldRowMissing),
            },
        }
    }

    fn extract_name(&self) -> Option<String> {
        let title = stripped_text(self.document.select(&TITLE).next()?);
        let head = title.split(TITLE_MARKER).next().unwrap_or_default();

        let short = head
            .split_whitespace()
            .take(NAME_WORDS)
            .collect::<Vec<_>>()
            .join(" ");

        (!short.is_empty()).then_some(short)
    }

    // First labelled row wins, even when it has no data cell.
    fn extract_raw_yield(table: ElementRef) -> Option<String> {
        let row = table.select(&BODY_ROWS).find(|row| {
            row.select(&HEADER_CELL)
                .next()
                .map(stripped_text)
                .is_some_and(|label| label.contains(YIELD_LABEL))
        })?;

        row.select(&DATA_CELL).next().map(stripped_text)
    }
}

/// Text of an element with each fragment trimmed and the pieces joined
/// without separators.
fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Best-effort conversion of a cell like `"4.25%"` to `4.25`.
///
/// Unparseable text gives `None` rather than an error; callers treat it the
/// same as a missing cell.
pub fn parse_yield(raw: &str) -> Option<f64> {
    raw.trim().replace('%', "").trim().parse().ok()
}
