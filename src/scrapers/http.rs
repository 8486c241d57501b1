use crate::scrapers::traits::PageSource;
use crate::scrapers::types::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Plain reqwest-backed page source
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    /// Build a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str, user_agent: Option<&str>) -> Result<String, FetchError> {
        debug!("Fetching URL: {}", url);

        let mut request = self.client.get(url);
        if let Some(agent) = user_agent {
            request = request.header(USER_AGENT, agent);
        }

        let response = request.send().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
