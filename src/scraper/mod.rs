mod fund;

pub use fund::{parse_yield, Extraction, FundPageScraper};

use crate::error::{Result, ScraperError};
use scraper::{Html, Selector};

/// The container holding a fund's measures table.
pub const MEASURES_TABLE: &str = "div.sal-measures__value-table table";

pub struct Scraper {
    document: Html,
}

impl Scraper {
    pub fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn fund(&self) -> FundPageScraper {
        FundPageScraper::new(&self.document)
    }

    /// Whether any element matches `css`.
    pub fn contains(&self, css: &str) -> Result<bool> {
        let selector =
            Selector::parse(css).map_err(|e| ScraperError::SelectorError(e.to_string()))?;
        Ok(self.document.select(&selector).next().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_matches_measures_table() {
        let scraper = Scraper::new(
            r#"<div class="sal-measures__value-table"><table><tr><td>1</td></tr></table></div>"#,
        );
        assert!(scraper.contains(MEASURES_TABLE).unwrap());
        assert!(!scraper.contains("div.sal-holdings table").unwrap());
    }

    #[test]
    fn contains_rejects_bad_selector() {
        assert!(Scraper::new("<p></p>").contains("p[").is_err());
    }
}
