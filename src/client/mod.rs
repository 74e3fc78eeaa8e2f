mod builder;

use crate::error::{ClientError, Result};
pub use builder::ClientBuilder;
use url::Url;

/// A fetched page. `url` is where redirects ended up.
#[derive(Debug)]
pub struct ClientResponse {
    pub status: u16,
    pub url: String,
    pub content: String,
}

pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub async fn get(&self, url: &str) -> Result<ClientResponse> {
        let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))?;

        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ResponseError {
                status_code: status.as_u16(),
            }
            .into());
        }

        let final_url = response.url().to_string();
        let content = response
            .text()
            .await
            .map_err(|e| ClientError::RequestFailed(format!("reading body of {}: {}", final_url, e)))?;

        Ok(ClientResponse {
            status: status.as_u16(),
            url: final_url,
            content,
        })
    }
}
