//! Identity cache contract.
//!
//! The identity cache maps `"user:" + subject id` to the [`Subject`] captured
//! at issuance, with a per-entry TTL. It is both the session lookup used by
//! verification and the authoritative revocation mechanism: a token whose
//! subject has no live entry is never honored.
//!
//! ## Backends
//!
//! - [`LocalIdentityCache`]: in-process `DashMap`, expiry read from an
//!   injected clock
//! - Redis (in `keystile-server`): shared across instances, native TTL
//!
//! Implementations do their own synchronization. Callers never lock around
//! `get`/`set`, and `set` unconditionally replaces the value and its TTL.

pub mod local;

use std::time::Duration;

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Subject;

pub use local::LocalIdentityCache;

/// Key prefix for subject entries.
pub const SUBJECT_KEY_PREFIX: &str = "user:";

/// Builds the cache key for a subject id.
#[must_use]
pub fn cache_key(subject_id: &str) -> String {
    format!("{SUBJECT_KEY_PREFIX}{subject_id}")
}

/// TTL-bounded store of session identities.
#[async_trait]
pub trait IdentityCache: Send + Sync {
    /// Looks up a live entry.
    ///
    /// Returns `Ok(None)` if the key is absent or its TTL has elapsed; an
    /// expired entry is never reported as live.
    async fn get(&self, key: &str) -> AuthResult<Option<Subject>>;

    /// Stores `subject` under `key` for `ttl`, replacing any existing entry.
    async fn set(&self, key: &str, subject: Subject, ttl: Duration) -> AuthResult<()>;

    /// Removes an entry ahead of its TTL.
    async fn invalidate(&self, key: &str) -> AuthResult<()>;

    /// Get cache statistics for monitoring.
    fn stats(&self) -> CacheStats;

    /// Clean up expired entries.
    ///
    /// Called by the background cleanup task. Backends with native TTL keep
    /// the default no-op.
    fn cleanup_expired(&self) -> usize {
        0
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of entries currently held (0 when the backend cannot tell).
    pub size: usize,
    /// Number of lookups that found a live entry.
    pub hits: u64,
    /// Number of lookups that found nothing live.
    pub misses: u64,
    /// Number of entries removed because their TTL elapsed.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
