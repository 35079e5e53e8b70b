//! Identity cache backend selection.
//!
//! - **Local (DashMap)**: in-process, per-instance sessions
//! - **Redis**: shared across instances, native TTL
//!
//! ## Graceful Degradation
//!
//! If Redis is selected but the pool cannot be created or reached at
//! startup, the server falls back to the local cache and logs a warning.

pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use keystile_auth::{Clock, IdentityCache, LocalIdentityCache};

use crate::config::{AppConfig, CacheBackendKind, RedisConfig};

pub use self::redis::RedisIdentityCache;

/// Creates the identity cache selected by `config.cache.backend`.
pub async fn create_identity_cache(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Arc<dyn IdentityCache> {
    match config.cache.backend {
        CacheBackendKind::Local => {
            tracing::info!("Using local identity cache");
            Arc::new(LocalIdentityCache::new(clock))
        }
        CacheBackendKind::Redis => match connect_redis(&config.redis).await {
            Some(pool) => Arc::new(RedisIdentityCache::new(pool)),
            None => Arc::new(LocalIdentityCache::new(clock)),
        },
    }
}

async fn connect_redis(config: &RedisConfig) -> Option<deadpool_redis::Pool> {
    tracing::info!("Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    if let Some(ref mut pool_config) = redis_config.pool {
        pool_config.max_size = config.pool_size;
        pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
    }

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to local identity cache."
            );
            return None;
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("Connected to Redis");
            Some(pool)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to local identity cache."
            );
            None
        }
    }
}

/// Periodically sweeps expired entries from `cache`.
///
/// A no-op sweep for backends with native TTL.
pub fn spawn_cleanup_task(
    cache: Arc<dyn IdentityCache>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;

            let removed = cache.cleanup_expired();
            if removed > 0 {
                let stats = cache.stats();
                tracing::debug!(
                    removed,
                    size = stats.size,
                    hit_rate = stats.hit_rate(),
                    "Identity cache cleanup completed"
                );
            }
        }
    })
}
