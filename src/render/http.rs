use super::Renderer;
use crate::client::Client;
use crate::config::HttpConfig;
use crate::error::{RenderError, Result};
use crate::log_debug;
use crate::scraper::Scraper;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout as with_timeout;

/// Fetches pages without running scripts. Only useful when the measures table
/// is present in the server response.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .accept_language(&config.accept_language);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(
        &self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> std::result::Result<String, RenderError> {
        let timed_out = || RenderError::Timeout {
            selector: wait_selector.to_string(),
            waited: timeout,
        };

        let response = with_timeout(timeout, self.client.get(url))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        log_debug!(
            "[render] GET {} -> {} ({} bytes)",
            url,
            response.status,
            response.content.len()
        );

        // A static page will not grow the element later
        let present = Scraper::new(&response.content)
            .contains(wait_selector)
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        if present {
            Ok(response.content)
        } else {
            Err(timed_out())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::MEASURES_TABLE;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FUND_PAGE: &str = r#"<html><head><title>ABC Growth Fund Overview | Morningstar</title></head>
        <body><div class="sal-measures__value-table"><table><tbody>
        <tr><th>Dividend Yield</th><td>3.10%</td></tr>
        </tbody></table></div></body></html>"#;

    fn renderer() -> HttpRenderer {
        let config = HttpConfig {
            user_agent: "yield-scraper-test".to_string(),
            ..HttpConfig::default()
        };
        HttpRenderer::new(&config).unwrap()
    }

    async fn create_mock_server(fund_id: &str, response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/fund/{fund_id}/portfolio")))
            .respond_with(response)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn returns_markup_when_table_is_present() {
        let server =
            create_mock_server("41388", ResponseTemplate::new(200).set_body_string(FUND_PAGE))
                .await;
        let url = format!("{}/fund/41388/portfolio", server.uri());

        let html = renderer()
            .render(&url, MEASURES_TABLE, Duration::from_secs(5))
            .await
            .unwrap();

        assert!(html.contains("3.10%"));
    }

    #[tokio::test]
    async fn missing_table_is_a_timeout() {
        let server = create_mock_server(
            "99999",
            ResponseTemplate::new(200).set_body_string("<html><body>loading</body></html>"),
        )
        .await;
        let url = format!("{}/fund/99999/portfolio", server.uri());

        let err = renderer()
            .render(&url, MEASURES_TABLE, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Timeout { .. }));
    }

    #[tokio::test]
    async fn slow_response_is_a_timeout() {
        let server = create_mock_server(
            "41388",
            ResponseTemplate::new(200)
                .set_body_string(FUND_PAGE)
                .set_delay(Duration::from_secs(2)),
        )
        .await;
        let url = format!("{}/fund/41388/portfolio", server.uri());

        let err = renderer()
            .render(&url, MEASURES_TABLE, Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Timeout { .. }));
    }

    #[tokio::test]
    async fn error_status_is_a_navigation_failure() {
        let server = create_mock_server("404", ResponseTemplate::new(404)).await;
        let url = format!("{}/fund/404/portfolio", server.uri());

        let err = renderer()
            .render(&url, MEASURES_TABLE, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Navigation(_)));
    }
}
