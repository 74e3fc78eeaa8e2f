mod browser;
mod http;

pub use self::browser::BrowserRenderer;
pub use self::http::HttpRenderer;

use crate::config::{Config, RendererKind};
use crate::error::{RenderError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Turns a URL into markup once `wait_selector` is present on the page.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> std::result::Result<String, RenderError>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

pub fn from_config(config: &Config) -> Result<Box<dyn Renderer>> {
    Ok(match config.renderer {
        RendererKind::Browser => Box::new(BrowserRenderer::launch(&config.browser)?),
        RendererKind::Http => Box::new(HttpRenderer::new(&config.http)?),
    })
}
