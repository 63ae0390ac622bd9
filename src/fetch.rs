use anyhow::{Context, Result};
use async_trait::async_trait;

/// Fetches a remote resource body: feed XML, an OPML document, or article HTML.
///
/// Kept as a trait so the pipeline can run against fixture bodies in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("non-2xx response from {url}"))?;
        resp.text()
            .await
            .with_context(|| format!("reading body from {url}"))
    }
}
