use tracing::{debug, info};

use crate::{cache::Cache, limiter::RateLimiter, parse::Document, request::Transport, Result};

/// Cache-first, paced page retrieval. Owns the cache for the duration of a run.
pub struct Fetcher<T> {
    transport: T,
    cache: Cache,
    limiter: RateLimiter,
    requests: usize,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, cache: Cache, limiter: RateLimiter) -> Self {
        debug!(
            interval_ms = limiter.interval().as_millis() as u64,
            cached = cache.len(),
            "fetcher ready"
        );
        Self {
            transport,
            cache,
            limiter,
            requests: 0,
        }
    }

    /// Returns the page at `url`, from the cache when fresh, otherwise from the network.
    /// Network errors are returned as-is; nothing is retried.
    pub async fn fetch(&mut self, url: &str) -> Result<Document> {
        if let Some(doc) = self.cache.get(url) {
            debug!(url, "cache hit");
            return Ok(doc);
        }

        self.limiter.acquire().await;
        info!(url, "Fetching page");
        self.requests += 1;
        let markup = self.transport.get_text(url).await?;
        let doc = Document::parse(&markup);
        self.cache.put(url, markup);
        Ok(doc)
    }

    /// Downloads a binary resource. Paced like [`Fetcher::fetch`] but never cached.
    pub async fn download(&mut self, url: &str) -> Result<Vec<u8>> {
        self.limiter.acquire().await;
        self.requests += 1;
        self.transport.get_bytes(url).await
    }

    /// Number of network requests issued so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Persists the cache. Call once, at the end of a run.
    pub async fn finish(&self) -> Result<()> {
        self.cache.flush().await
    }
}
