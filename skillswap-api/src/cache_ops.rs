//! Domain cache operations over the injected [`ListCache`].
//!
//! Both caches are strictly best-effort: every failure here is logged and
//! absorbed, so a cache outage degrades to store reads and never fails a
//! request.

use uuid::Uuid;

use skillswap_shared::cache::ListCache;

use crate::models::{ChatMessage, SkillPost};

pub const FEED_CACHE_KEY: &str = "feed:recent";
pub const FEED_CACHE_CAP: usize = 200;

pub const CHAT_CACHE_CAP: usize = 50;
pub const CHAT_CACHE_TTL_SECS: u64 = 86_400;

pub fn chat_cache_key(connection_id: Uuid) -> String {
    format!("chat:{connection_id}")
}

/// Up to `limit` feed entries, newest first. `None` is a miss: an empty or
/// absent list, a failed read, or an entry that no longer decodes.
pub async fn cached_skill_feed(cache: &dyn ListCache, limit: usize) -> Option<Vec<SkillPost>> {
    let values = match cache.range(FEED_CACHE_KEY, limit).await {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(error = %e, "feed cache read failed");
            return None;
        }
    };
    if values.is_empty() {
        return None;
    }

    let mut posts = Vec::with_capacity(values.len());
    for value in &values {
        match serde_json::from_str::<SkillPost>(value) {
            Ok(post) => posts.push(post),
            Err(e) => {
                tracing::warn!(error = %e, "corrupt feed cache entry, treating as miss");
                return None;
            }
        }
    }
    Some(posts)
}

/// Wholesale replace of the feed cache, newest first, capped.
pub async fn cache_skill_feed(cache: &dyn ListCache, posts: &[SkillPost]) {
    let values: Vec<String> = posts
        .iter()
        .take(FEED_CACHE_CAP)
        .filter_map(|p| serde_json::to_string(p).ok())
        .collect();
    if let Err(e) = cache.replace(FEED_CACHE_KEY, &values).await {
        tracing::warn!(error = %e, "feed cache update failed");
    }
}

/// Read-modify-write used on skill creation: prepend the new post to the
/// cached window and write the combined list back.
pub async fn prepend_skill_to_feed(cache: &dyn ListCache, post: &SkillPost) {
    let mut feed = cached_skill_feed(cache, FEED_CACHE_CAP)
        .await
        .unwrap_or_default();
    feed.insert(0, post.clone());
    cache_skill_feed(cache, &feed).await;
}

/// The most recent `limit` messages for a connection, re-ordered from the
/// stored newest-first layout to chronological. `None` is a miss.
pub async fn cached_chat_messages(
    cache: &dyn ListCache,
    connection_id: Uuid,
    limit: usize,
) -> Option<Vec<ChatMessage>> {
    let key = chat_cache_key(connection_id);
    let values = match cache.range(&key, limit).await {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(error = %e, connection_id = %connection_id, "chat cache read failed");
            return None;
        }
    };
    if values.is_empty() {
        return None;
    }

    let mut messages = Vec::with_capacity(values.len());
    for value in &values {
        match serde_json::from_str::<ChatMessage>(value) {
            Ok(message) => messages.push(message),
            Err(e) => {
                tracing::warn!(error = %e, connection_id = %connection_id, "corrupt chat cache entry, treating as miss");
                return None;
            }
        }
    }
    messages.reverse();
    Some(messages)
}

/// Push one message to the head of the connection's list, trim to the cap,
/// refresh the 24h TTL.
pub async fn cache_chat_message(cache: &dyn ListCache, connection_id: Uuid, message: &ChatMessage) {
    let value = match serde_json::to_string(message) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize chat message for cache");
            return;
        }
    };

    let key = chat_cache_key(connection_id);
    let result = async {
        cache.push_front(&key, &value).await?;
        cache.trim(&key, CHAT_CACHE_CAP).await?;
        cache.expire(&key, CHAT_CACHE_TTL_SECS).await
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, connection_id = %connection_id, "chat cache update failed");
    }
}
