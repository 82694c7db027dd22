use axum::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{CacheError, ListCache};

#[derive(Clone)]
pub struct RedisListCache {
    conn: ConnectionManager,
}

impl RedisListCache {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        tracing::info!(url = %url, "connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl ListCache for RedisListCache {
    async fn push_front(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>, CacheError> {
        if limit == 0 {
            return Ok(vec![]);
        }
        let mut conn = self.conn.clone();
        let values: Vec<String> = conn.lrange(key, 0, limit as isize - 1).await?;
        Ok(values)
    }

    async fn trim(&self, key: &str, max_len: usize) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.ltrim::<_, ()>(key, 0, max_len as isize - 1).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.expire::<_, ()>(key, ttl_secs as i64).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn replace(&self, key: &str, values: &[String]) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic().del(key);
        if !values.is_empty() {
            // RPUSH keeps values[0] at the head.
            pipe.rpush(key, values);
        }
        pipe.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }
}
