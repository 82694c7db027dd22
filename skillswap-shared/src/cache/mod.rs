//! Bounded ordered-list cache abstraction.
//!
//! The relational store is the writer-of-record; these lists are advisory.
//! Every read has a store fallback and every caller is expected to treat a
//! `CacheError` as a miss or a no-op write, never as a request failure.

use axum::async_trait;

mod memory;
mod redis_impl;

pub use memory::InMemoryListCache;
pub use redis_impl::RedisListCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Ordered bounded list keyed by a cache key, newest entry at the head.
#[async_trait]
pub trait ListCache: Send + Sync {
    /// Prepend one serialized entry.
    async fn push_front(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Read up to `limit` entries from the head (newest first). An absent
    /// key reads as empty, which callers treat as a miss.
    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>, CacheError>;

    /// Drop everything past the first `max_len` entries.
    async fn trim(&self, key: &str, max_len: usize) -> Result<(), CacheError>;

    /// Set or refresh the key's time-to-live.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// Replace the whole list. `values[0]` becomes the head.
    async fn replace(&self, key: &str, values: &[String]) -> Result<(), CacheError>;
}
