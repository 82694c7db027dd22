use std::collections::HashMap;
use std::sync::Mutex;

use axum::async_trait;

use super::{CacheError, ListCache};

#[derive(Debug, Default)]
struct Entry {
    values: Vec<String>,
    ttl_secs: Option<u64>,
}

/// In-process `ListCache` used to substitute Redis in tests.
///
/// TTLs are recorded, not enforced; tests assert on the recorded value.
#[derive(Default)]
pub struct InMemoryListCache {
    inner: Mutex<HashMap<String, Entry>>,
}

impl InMemoryListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The TTL last set on `key`, if any.
    pub fn ttl_secs(&self, key: &str) -> Option<u64> {
        self.inner.lock().unwrap().get(key).and_then(|e| e.ttl_secs)
    }

    /// Current length of the list at `key`.
    pub fn len(&self, key: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .get(key)
            .map(|e| e.values.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, key: &str) -> bool {
        self.len(key) == 0
    }
}

#[async_trait]
impl ListCache for InMemoryListCache {
    async fn push_front(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner.entry(key.to_string()).or_default();
        entry.values.insert(0, value.to_string());
        Ok(())
    }

    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>, CacheError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .get(key)
            .map(|e| e.values.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn trim(&self, key: &str, max_len: usize) -> Result<(), CacheError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.get_mut(key) {
            entry.values.truncate(max_len);
        }
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.get_mut(key) {
            entry.ttl_secs = Some(ttl_secs);
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.inner.lock().unwrap().remove(key);
        Ok(())
    }

    async fn replace(&self, key: &str, values: &[String]) -> Result<(), CacheError> {
        let mut inner = self.inner.lock().unwrap();
        if values.is_empty() {
            inner.remove(key);
        } else {
            let entry = inner.entry(key.to_string()).or_default();
            entry.values = values.to_vec();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_front_keeps_newest_at_head() {
        let cache = InMemoryListCache::new();
        cache.push_front("k", "a").await.unwrap();
        cache.push_front("k", "b").await.unwrap();
        cache.push_front("k", "c").await.unwrap();

        let values = cache.range("k", 10).await.unwrap();
        assert_eq!(values, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn range_honors_limit_and_missing_key() {
        let cache = InMemoryListCache::new();
        assert!(cache.range("missing", 5).await.unwrap().is_empty());

        for i in 0..5 {
            cache.push_front("k", &i.to_string()).await.unwrap();
        }
        assert_eq!(cache.range("k", 2).await.unwrap(), vec!["4", "3"]);
    }

    #[tokio::test]
    async fn trim_drops_the_tail() {
        let cache = InMemoryListCache::new();
        for i in 0..4 {
            cache.push_front("k", &i.to_string()).await.unwrap();
        }
        cache.trim("k", 2).await.unwrap();
        assert_eq!(cache.range("k", 10).await.unwrap(), vec!["3", "2"]);
    }

    #[tokio::test]
    async fn replace_preserves_given_order() {
        let cache = InMemoryListCache::new();
        cache.push_front("k", "old").await.unwrap();
        cache
            .replace("k", &["n1".into(), "n2".into(), "n3".into()])
            .await
            .unwrap();
        assert_eq!(cache.range("k", 10).await.unwrap(), vec!["n1", "n2", "n3"]);
    }

    #[tokio::test]
    async fn expire_records_ttl() {
        let cache = InMemoryListCache::new();
        cache.push_front("k", "a").await.unwrap();
        cache.expire("k", 86_400).await.unwrap();
        assert_eq!(cache.ttl_secs("k"), Some(86_400));
    }
}
