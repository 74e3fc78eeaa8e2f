use crate::config::{FetchSettings, JobConfig};
use crate::error::FetchError;
use crate::render::Renderer;
use crate::scraper::{parse_yield, Extraction, Scraper};
use crate::{log_debug, log_info, log_warn};
use serde::Serialize;

/// One output row per fund identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundRecord {
    pub fund_name: String,
    #[serde(rename = "FUNDID")]
    pub fund_id: String,
    pub raw_yield: Option<String>,
    #[serde(rename = "yield_%")]
    pub yield_percent: Option<f64>,
    pub error: String,
}

impl FundRecord {
    fn new(fund_id: &str, extraction: Extraction) -> Self {
        let yield_percent = extraction
            .raw_yield
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .and_then(parse_yield);

        Self {
            fund_name: extraction.name.unwrap_or_else(|| fund_id.to_string()),
            fund_id: fund_id.to_string(),
            raw_yield: extraction.raw_yield,
            yield_percent,
            error: extraction
                .error
                .map(|e| e.to_string())
                .unwrap_or_default(),
        }
    }

    fn failed(fund_id: &str, error: FetchError) -> Self {
        Self::new(
            fund_id,
            Extraction {
                error: Some(error),
                ..Extraction::default()
            },
        )
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

/// Runs the fetch-extract-parse loop for one job, strictly one fund at a time.
pub struct BatchJob<'a> {
    renderer: &'a dyn Renderer,
    settings: &'a FetchSettings,
}

impl<'a> BatchJob<'a> {
    pub fn new(renderer: &'a dyn Renderer, settings: &'a FetchSettings) -> Self {
        Self { renderer, settings }
    }

    /// Always returns exactly one record per identifier, in input order.
    pub async fn run(&self, job: &JobConfig) -> Vec<FundRecord> {
        let total = job.fund_ids.len();
        let mut records = Vec::with_capacity(total);

        for (idx, fund_id) in job.fund_ids.iter().enumerate() {
            let record = self.collect(fund_id).await;

            match record.yield_percent {
                Some(value) => {
                    log_info!(
                        "[{}] [{}/{}] {} {} -> {}",
                        job.name,
                        idx + 1,
                        total,
                        fund_id,
                        record.fund_name,
                        value
                    );
                }
                None => {
                    log_warn!(
                        "[{}] [{}/{}] {} {} -> ERROR {}",
                        job.name,
                        idx + 1,
                        total,
                        fund_id,
                        record.fund_name,
                        record.error
                    );
                }
            }
            records.push(record);

            if idx + 1 < total && !self.settings.request_delay.is_zero() {
                tokio::time::sleep(self.settings.request_delay).await;
            }
        }

        records
    }

    async fn collect(&self, fund_id: &str) -> FundRecord {
        let url = self.settings.fund_url(fund_id);

        match self
            .renderer
            .render(&url, &self.settings.wait_selector, self.settings.timeout)
            .await
        {
            Ok(html) => FundRecord::new(fund_id, Scraper::new(&html).fund().extract()),
            Err(e) => {
                log_debug!(fund_id, url = %url, error = %e, "page did not render");
                FundRecord::failed(fund_id, e.into())
            }
        }
    }
}
