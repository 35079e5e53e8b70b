//! Redis-backed identity cache.
//!
//! Entries are stored as JSON with `SET key value EX ttl`, so expiry is
//! enforced atomically by Redis and shared by every server instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::Pool;
use keystile_auth::{AuthError, AuthResult, CacheStats, IdentityCache, Subject};
use redis::AsyncCommands;

pub struct RedisIdentityCache {
    pool: Pool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RedisIdentityCache {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    async fn connection(&self) -> AuthResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| AuthError::storage(format!("redis pool: {e}")))
    }
}

#[async_trait]
impl IdentityCache for RedisIdentityCache {
    async fn get(&self, key: &str) -> AuthResult<Option<Subject>> {
        let mut conn = self.connection().await?;
        let raw = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| AuthError::storage(format!("redis GET: {e}")))?;

        match raw {
            Some(json) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let subject = serde_json::from_str(&json)
                    .map_err(|e| AuthError::storage(format!("corrupt identity entry: {e}")))?;
                Ok(Some(subject))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, subject: Subject, ttl: Duration) -> AuthResult<()> {
        let json = serde_json::to_string(&subject)
            .map_err(|e| AuthError::internal(format!("serialize identity entry: {e}")))?;
        // Redis rejects EX 0; callers never pass a sub-second TTL.
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, json, ttl_secs)
            .await
            .map_err(|e| AuthError::storage(format!("redis SET: {e}")))
    }

    async fn invalidate(&self, key: &str) -> AuthResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| AuthError::storage(format!("redis DEL: {e}")))
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            size: 0,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_pool() -> Pool {
        let mut cfg = deadpool_redis::Config::from_url("redis://127.0.0.1:1");
        if let Some(ref mut pool) = cfg.pool {
            pool.timeouts.wait = Some(Duration::from_millis(200));
            pool.timeouts.create = Some(Duration::from_millis(200));
        }
        cfg.create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_redis_is_storage_error() {
        let cache = RedisIdentityCache::new(unreachable_pool());

        let err = cache.get("user:1").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage { .. }));

        let err = cache
            .set("user:1", Subject::new("1"), Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Storage { .. }));
    }
}
