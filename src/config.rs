use crate::error::{ConfigError, Result};
use scraper::Selector;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use url::Url;

pub const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    Browser,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Seconds the browser may sit idle before headless_chrome tears it down.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default)]
    pub proxy: Option<String>,
}

/// One collection run: a list of funds and the spreadsheet they land in.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub output: String,
    pub fund_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_url_template")]
    pub url_template: String,

    #[serde(default = "default_wait_selector")]
    pub wait_selector: String,

    /// Seconds to wait for the measures table on each page.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds to pause between funds. Zero disables the pause.
    #[serde(default = "default_request_delay")]
    pub request_delay: u64,

    #[serde(default = "default_renderer")]
    pub renderer: RendererKind,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LogConfig,

    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

/// The per-page settings the batch job needs, detached from the rest of the config.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub url_template: String,
    pub wait_selector: String,
    pub timeout: Duration,
    pub request_delay: Duration,
}

impl FetchSettings {
    pub fn fund_url(&self, fund_id: &str) -> String {
        self.url_template.replace(ID_PLACEHOLDER, fund_id)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
            filename: default_log_filename(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            user_agent: default_user_agent(),
            idle_timeout: default_idle_timeout(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            proxy: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::FileRead)?;
        let config = Self::parse(&content)?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            url_template: self.url_template.clone(),
            wait_selector: self.wait_selector.clone(),
            timeout: Duration::from_secs(self.timeout),
            request_delay: Duration::from_secs(self.request_delay),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.url_template.is_empty() {
            return Err(ConfigError::MissingField("url_template".to_string()).into());
        }
        if !self.url_template.starts_with("http") {
            return Err(ConfigError::InvalidValue(format!(
                "url_template must start with http(s): {}",
                self.url_template
            ))
            .into());
        }
        if !self.url_template.contains(ID_PLACEHOLDER) {
            return Err(ConfigError::InvalidValue(format!(
                "url_template must contain {}: {}",
                ID_PLACEHOLDER, self.url_template
            ))
            .into());
        }
        Url::parse(&self.url_template.replace(ID_PLACEHOLDER, "0")).map_err(|e| {
            ConfigError::InvalidValue(format!("url_template is not a valid URL: {}", e))
        })?;

        Selector::parse(&self.wait_selector).map_err(|e| {
            ConfigError::InvalidValue(format!(
                "wait_selector '{}' is not a valid selector: {}",
                self.wait_selector, e
            ))
        })?;

        if self.timeout == 0 {
            return Err(
                ConfigError::InvalidValue("timeout must be greater than 0".to_string()).into(),
            );
        }

        if self.jobs.is_empty() {
            return Err(ConfigError::MissingField("jobs".to_string()).into());
        }

        let mut names = HashSet::new();
        for job in &self.jobs {
            job.validate()?;
            if !names.insert(job.name.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate job name: {}",
                    job.name
                ))
                .into());
            }
        }

        Ok(())
    }
}

impl JobConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("job name cannot be empty".to_string()).into());
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "job '{}' has an empty output path",
                self.name
            ))
            .into());
        }
        if crate::export::OutputFormat::from_path(&self.output).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "job '{}' output must end in .xlsx or .json: {}",
                self.name, self.output
            ))
            .into());
        }
        if self.fund_ids.is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "job '{}' has no fund_ids",
                self.name
            ))
            .into());
        }
        if let Some(blank) = self.fund_ids.iter().position(|id| id.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(format!(
                "job '{}' has a blank fund id at position {}",
                self.name, blank
            ))
            .into());
        }
        Ok(())
    }
}

fn default_url_template() -> String {
    "https://www.morningstar.com.au/investments/security/fund/{id}/portfolio".to_string()
}

fn default_wait_selector() -> String {
    crate::scraper::MEASURES_TABLE.to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_request_delay() -> u64 {
    1
}

fn default_renderer() -> RendererKind {
    RendererKind::Browser
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "en-AU,en;q=0.8".to_string()
}

fn default_idle_timeout() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_filename() -> String {
    "yield-scraper.log".to_string()
}
