use super::Renderer;
use crate::config::BrowserConfig;
use crate::error::{RenderError, Result};
use crate::log_info;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A single headless Chrome tab reused for every page.
pub struct BrowserRenderer {
    // Dropping the browser kills the Chrome process
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserRenderer {
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(config.sandbox)
            .idle_browser_timeout(Duration::from_secs(config.idle_timeout))
            .args(vec![OsStr::new("--disable-gpu")])
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| RenderError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        log_info!("[render] Launched headless browser (headless={})", config.headless);
        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

/// What is left of `timeout` once `spent` has gone on loading the page.
fn remaining_budget(timeout: Duration, spent: Duration) -> Option<Duration> {
    timeout.checked_sub(spent).filter(|left| !left.is_zero())
}

fn navigate_and_wait(
    tab: &Tab,
    url: &str,
    wait_selector: &str,
    timeout: Duration,
) -> std::result::Result<String, RenderError> {
    let timed_out = || RenderError::Timeout {
        selector: wait_selector.to_string(),
        waited: timeout,
    };
    let started = Instant::now();

    tab.set_default_timeout(timeout);
    tab.navigate_to(url)
        .map_err(|e| RenderError::Navigation(format!("{}: {}", url, e)))?;
    tab.wait_until_navigated().map_err(|_| timed_out())?;

    // Page load and the selector wait share one budget
    let left = remaining_budget(timeout, started.elapsed()).ok_or_else(timed_out)?;
    tab.wait_for_element_with_custom_timeout(wait_selector, left)
        .map_err(|_| timed_out())?;

    tab.get_content()
        .map_err(|e| RenderError::Navigation(format!("{}: {}", url, e)))
}

#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(
        &self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> std::result::Result<String, RenderError> {
        let tab = Arc::clone(&self.tab);
        let url = url.to_string();
        let wait_selector = wait_selector.to_string();

        tokio::task::spawn_blocking(move || navigate_and_wait(&tab, &url, &wait_selector, timeout))
            .await
            .map_err(|e| RenderError::Navigation(format!("render task failed: {}", e)))?
    }

    async fn close(&self) -> Result<()> {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || tab.close(true))
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?
            .map_err(|e| RenderError::Navigation(format!("failed to close tab: {}", e)))?;
        log_info!("[render] Closed browser tab");
        Ok(())
    }
}
