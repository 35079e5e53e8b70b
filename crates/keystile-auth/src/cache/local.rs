//! In-process identity cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::cache::{CacheStats, IdentityCache};
use crate::clock::{Clock, SystemClock};
use crate::error::AuthError;
use crate::types::Subject;

struct CachedEntry {
    subject: Subject,
    expires_at: OffsetDateTime,
}

/// `DashMap`-backed identity cache.
///
/// Expiry is absolute and computed from the injected clock, so tests can
/// move time with a [`ManualClock`](crate::clock::ManualClock) instead of
/// sleeping. Expired entries are evicted lazily on `get` and in bulk by
/// [`cleanup_expired`](Self::cleanup_expired).
pub struct LocalIdentityCache {
    entries: DashMap<String, CachedEntry>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl LocalIdentityCache {
    /// Creates an empty cache reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Creates an empty cache on the wall clock.
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Time left before `key` expires, if it is live.
    pub fn remaining_ttl(&self, key: &str) -> Option<time::Duration> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .map(|entry| entry.expires_at - now)
            .filter(|left| left.is_positive())
    }

    /// Removes every entry whose TTL has elapsed.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            if entry.expires_at <= now {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
            tracing::debug!(removed, "Swept expired identity cache entries");
        }

        removed
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl IdentityCache for LocalIdentityCache {
    async fn get(&self, key: &str) -> AuthResult<Option<Subject>> {
        let now = self.clock.now();

        let found = self
            .entries
            .get(key)
            .map(|entry| (entry.expires_at > now).then(|| entry.subject.clone()));

        match found {
            Some(Some(subject)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(subject))
            }
            Some(None) => {
                // Only evict if no concurrent set refreshed the entry meanwhile.
                if self
                    .entries
                    .remove_if(key, |_, entry| entry.expires_at <= now)
                    .is_some()
                {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, subject: Subject, ttl: Duration) -> AuthResult<()> {
        let ttl = time::Duration::try_from(ttl)
            .map_err(|e| AuthError::internal(format!("cache ttl out of range: {e}")))?;
        let expires_at = self
            .clock
            .now()
            .checked_add(ttl)
            .ok_or_else(|| AuthError::internal("cache expiry overflows the calendar"))?;

        self.entries
            .insert(key.to_string(), CachedEntry { subject, expires_at });
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> AuthResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn cleanup_expired(&self) -> usize {
        LocalIdentityCache::cleanup_expired(self)
    }
}
