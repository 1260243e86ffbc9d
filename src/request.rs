use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{Config, Error, Result};

/// Raw network access. The fetcher layers caching and pacing on top of this.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Requests a page and returns its body as text.
    async fn get_text(&self, url: &str) -> Result<String>;
    /// Requests a binary resource such as an image.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Transport`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        debug!(url, "GET");
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(res)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        let html = self.send(url).await?.text().await?;
        Ok(html)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self.send(url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
