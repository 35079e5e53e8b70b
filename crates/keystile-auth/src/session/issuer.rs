//! Session issuance.
//!
//! The issuer is the single path by which token pairs are minted: login and
//! refresh both end here. Every issuance (re)binds the subject's session
//! window by overwriting its identity cache entry.

use std::sync::Arc;
use std::time::Duration;

use crate::AuthResult;
use crate::cache::{IdentityCache, cache_key};
use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::{AccessClaims, RefreshClaims, TokenCodec};
use crate::types::{Subject, TokenPair};

/// Mints access/refresh token pairs and records the subject in the cache.
pub struct SessionIssuer {
    codec: TokenCodec,
    cache: Arc<dyn IdentityCache>,
    clock: Arc<dyn Clock>,
    access_token_lifetime: time::Duration,
    safety_margin: time::Duration,
}

impl SessionIssuer {
    /// Creates an issuer from validated settings.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the settings are invalid, in
    /// particular if the access token lifetime does not exceed the cache
    /// safety margin.
    pub fn new(
        config: &AuthConfig,
        codec: TokenCodec,
        cache: Arc<dyn IdentityCache>,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        config
            .validate()
            .map_err(|e| AuthError::configuration(e.to_string()))?;

        Ok(Self {
            codec,
            cache,
            clock,
            access_token_lifetime: to_time(config.access_token_lifetime)?,
            safety_margin: to_time(config.cache_safety_margin)?,
        })
    }

    /// Issues a new token pair for `subject`.
    ///
    /// The subject is cached under `"user:" + id` for the access token's
    /// remaining lifetime minus the safety margin, replacing any previous
    /// session for the same subject.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if signing fails,
    /// `AuthError::Configuration` if the token expiry cannot be represented or
    /// the computed cache TTL is not positive,
    /// and whatever the cache reports if the entry cannot be stored.
    pub async fn issue(&self, mut subject: Subject) -> AuthResult<TokenPair> {
        // A stray `id` attribute would serialize as a duplicate key.
        subject.attributes.remove(Subject::ID_KEY);
        let now = self.clock.now();

        let access = AccessClaims::new(subject.id.as_str(), now, self.access_token_lifetime)
            .ok_or_else(|| {
                AuthError::configuration("access token expiry is out of the supported date range")
            })?;
        let access_token = self
            .codec
            .sign(&access)
            .map_err(|e| AuthError::internal(e.to_string()))?;

        let refresh = RefreshClaims::paired_with(subject.id.as_str(), &access_token);
        let refresh_token = self
            .codec
            .sign(&refresh)
            .map_err(|e| AuthError::internal(e.to_string()))?;

        let ttl_secs = access.remaining_seconds(now) - self.safety_margin.whole_seconds();
        let ttl = u64::try_from(ttl_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                AuthError::configuration(format!(
                    "identity cache ttl must be positive, got {ttl_secs}s"
                ))
            })?;

        let key = cache_key(&subject.id);
        let subject_id = subject.id.clone();
        self.cache.set(&key, subject, ttl).await?;

        tracing::debug!(subject = %subject_id, ttl_secs, "Issued session");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub(crate) fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub(crate) fn cache(&self) -> &Arc<dyn IdentityCache> {
        &self.cache
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

fn to_time(duration: Duration) -> AuthResult<time::Duration> {
    time::Duration::try_from(duration)
        .map_err(|e| AuthError::configuration(format!("duration out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalIdentityCache;
    use crate::clock::ManualClock;
    use time::macros::datetime;

    fn issuer() -> (SessionIssuer, Arc<LocalIdentityCache>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(datetime!(2024-05-01 08:00 UTC)));
        let cache = Arc::new(LocalIdentityCache::new(clock.clone()));
        let config = AuthConfig::with_secret("issuer-test-secret");
        let issuer = SessionIssuer::new(
            &config,
            TokenCodec::from_secret(config.token_secret.as_bytes()),
            cache.clone(),
            clock.clone(),
        )
        .unwrap();
        (issuer, cache, clock)
    }

    #[tokio::test]
    async fn test_issue_caches_subject() {
        let (issuer, cache, _clock) = issuer();
        let subject = Subject::new("12345").with_attribute("name", "Ada");

        let pair = issuer.issue(subject.clone()).await.unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);

        assert_eq!(cache.get("user:12345").await.unwrap(), Some(subject));
    }

    #[tokio::test]
    async fn test_cache_ttl_trails_token_expiry_by_margin() {
        let (issuer, cache, clock) = issuer();
        let pair = issuer.issue(Subject::new("12345")).await.unwrap();

        let claims: AccessClaims = issuer.codec().verify(&pair.access_token).unwrap();
        let token_left = claims.remaining_seconds(clock.now());
        let cache_left = cache.remaining_ttl("user:12345").unwrap().whole_seconds();

        assert_eq!(token_left, 7 * 24 * 3600);
        assert_eq!(token_left - cache_left, 300);
    }

    #[tokio::test]
    async fn test_refresh_token_is_paired_with_access_token() {
        let (issuer, _cache, _clock) = issuer();
        let pair = issuer.issue(Subject::new("12345")).await.unwrap();

        let refresh: RefreshClaims = issuer.codec().verify(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, "12345");
        assert_eq!(
            refresh.fingerprint,
            Some(crate::token::fingerprint(&pair.access_token))
        );
    }

    #[tokio::test]
    async fn test_issue_drops_id_attribute() {
        let (issuer, cache, _clock) = issuer();
        let mut subject = Subject::new("12345");
        subject
            .attributes
            .insert("id".to_string(), serde_json::json!("shadow"));

        issuer.issue(subject).await.unwrap();

        let cached = cache.get("user:12345").await.unwrap().unwrap();
        assert_eq!(cached, Subject::new("12345"));
        let json = serde_json::to_string(&cached).unwrap();
        assert_eq!(json, r#"{"id":"12345"}"#);
    }

    #[test]
    fn test_lifetime_not_exceeding_margin_is_rejected() {
        let clock = Arc::new(ManualClock::starting_now());
        let mut config = AuthConfig::with_secret("s");
        config.access_token_lifetime = Duration::from_secs(60);

        let result = SessionIssuer::new(
            &config,
            TokenCodec::from_secret(b"s"),
            Arc::new(LocalIdentityCache::new(clock.clone())),
            clock,
        );
        assert!(matches!(result, Err(AuthError::Configuration { .. })));
    }
}
