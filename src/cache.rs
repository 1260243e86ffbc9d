//! On-disk page cache: `url -> (fetched_at, markup)`, read once at startup and written once at the end.

use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{parse::Document, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fetched_at: DateTime<Utc>,
    pub markup: String,
}

#[derive(Debug)]
pub struct Cache {
    path: PathBuf,
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Cache {
    /// An empty cache that will be written to `path` on [`Cache::flush`].
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Reads the cache file at `path`. A missing or unreadable file is not an error,
    /// the cache simply starts out empty.
    pub async fn load(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let mut cache = Self::new(path, ttl);
        let bytes = match tokio::fs::read(&cache.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %cache.path.display(), "no cache file, starting empty");
                return cache;
            }
            Err(err) => {
                warn!(path = %cache.path.display(), %err, "couldn't read cache file, starting empty");
                return cache;
            }
        };
        match bincode::deserialize::<HashMap<String, CacheEntry>>(&bytes) {
            Ok(entries) => {
                info!(path = %cache.path.display(), entries = entries.len(), "loaded cache");
                cache.entries = entries;
            }
            Err(err) => {
                warn!(path = %cache.path.display(), %err, "corrupt cache file, starting empty");
            }
        }
        cache
    }

    /// Writes every entry back to the cache file, replacing it.
    pub async fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = bincode::serialize(&self.entries)?;
        tokio::fs::write(&self.path, bytes).await?;
        info!(path = %self.path.display(), entries = self.entries.len(), "saved cache");
        Ok(())
    }

    pub fn get(&self, url: &str) -> Option<Document> {
        self.get_at(url, Utc::now())
    }

    /// The cached page for `url` if it was fetched less than one TTL before `now`.
    pub fn get_at(&self, url: &str, now: DateTime<Utc>) -> Option<Document> {
        let entry = self.entries.get(url)?;
        if now - entry.fetched_at < self.ttl {
            Some(Document::parse(&entry.markup))
        } else {
            debug!(url, fetched_at = %entry.fetched_at, "cache entry expired");
            None
        }
    }

    pub fn put(&mut self, url: &str, markup: String) {
        self.put_at(url, markup, Utc::now());
    }

    pub fn put_at(&mut self, url: &str, markup: String, fetched_at: DateTime<Utc>) {
        self.entries
            .insert(url.to_string(), CacheEntry { fetched_at, markup });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Node;

    const URL: &str = "https://umamusu.wiki/Special_Week";

    fn cache() -> Cache {
        Cache::new("unused.bin", Duration::days(7))
    }

    #[test]
    fn entry_is_fresh_until_exactly_one_ttl() {
        let mut cache = cache();
        let fetched = Utc::now();
        cache.put_at(URL, "<p>hi</p>".into(), fetched);

        assert!(cache.get_at(URL, fetched).is_some());
        let almost = fetched + Duration::days(7) - Duration::seconds(1);
        assert!(cache.get_at(URL, almost).is_some());
        assert!(cache.get_at(URL, fetched + Duration::days(7)).is_none());
        assert!(cache.get_at(URL, fetched + Duration::days(30)).is_none());
    }

    #[test]
    fn put_replaces_the_previous_entry() {
        let mut cache = cache();
        let now = Utc::now();
        cache.put_at(URL, "<p>old</p>".into(), now - Duration::days(10));
        assert!(cache.get_at(URL, now).is_none());

        cache.put_at(URL, "<p>new</p>".into(), now);
        assert_eq!(cache.len(), 1);
        let doc = cache.get_at(URL, now).unwrap();
        assert_eq!(doc.find("p", None).unwrap().clean_text(), "new");
    }

    #[test]
    fn unknown_url_is_a_miss() {
        assert!(cache().get(URL).is_none());
    }

    #[tokio::test]
    async fn survives_a_flush_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.bin");

        let mut cache = Cache::new(&path, Duration::days(7));
        cache.put(URL, "<h1>Special Week</h1>".into());
        cache.flush().await.unwrap();

        let reloaded = Cache::load(&path, Duration::days(7)).await;
        assert_eq!(reloaded.len(), 1);
        let doc = reloaded.get(URL).unwrap();
        assert_eq!(doc.find("h1", None).unwrap().clean_text(), "Special Week");
    }

    #[tokio::test]
    async fn missing_or_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Cache::load(dir.path().join("nope.bin"), Duration::days(7)).await;
        assert!(missing.is_empty());

        let corrupt_path = dir.path().join("corrupt.bin");
        std::fs::write(&corrupt_path, b"\xff\xff\xff\xff not bincode").unwrap();
        let corrupt = Cache::load(&corrupt_path, Duration::days(7)).await;
        assert!(corrupt.is_empty());
    }
}
