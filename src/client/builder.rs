use super::Client;
use crate::error::{ClientError, Result};
use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Proxy;

/// Collects page-fetch settings; every setter is checked when `build` runs.
#[derive(Default)]
pub struct ClientBuilder {
    user_agent: Option<String>,
    accept_language: Option<String>,
    proxy: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn accept_language(mut self, languages: impl Into<String>) -> Self {
        self.accept_language = Some(languages.into());
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (USER_AGENT, &self.user_agent),
            (ACCEPT_LANGUAGE, &self.accept_language),
        ] {
            if let Some(value) = value {
                headers.insert(name.clone(), header_value(&name, value)?);
            }
        }
        Ok(headers)
    }

    pub fn build(self) -> Result<Client> {
        let mut inner = reqwest::Client::builder().default_headers(self.default_headers()?);

        if let Some(proxy_url) = &self.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                ClientError::BuildError(format!("Invalid proxy {}: {}", proxy_url, e))
            })?;
            inner = inner.proxy(proxy);
        }

        let inner = inner
            .build()
            .map_err(|e| ClientError::BuildError(e.to_string()))?;
        Ok(Client { inner })
    }
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::BuildError(format!("Invalid {} header: {}", name, e)).into())
}
