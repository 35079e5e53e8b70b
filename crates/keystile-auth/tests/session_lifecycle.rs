//! End-to-end session lifecycle against the in-memory cache and a manual clock.

use std::sync::Arc;

use keystile_auth::prelude::*;
use keystile_auth::{AccessClaims, ManualClock, MobileSubjectResolver, RefreshClaims, TokenCodec};
use time::Duration;
use time::macros::datetime;
use tokio_test::{assert_err, assert_ok};

const SECRET: &str = "lifecycle-secret";

struct Harness {
    state: AuthState,
    cache: Arc<LocalIdentityCache>,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(datetime!(2024-06-01 12:00 UTC)));
        let cache = Arc::new(LocalIdentityCache::new(clock.clone()));
        let state = AuthState::from_config(
            &AuthConfig::with_secret(SECRET),
            cache.clone(),
            clock.clone(),
            Arc::new(MobileSubjectResolver),
        )
        .unwrap();
        Self {
            state,
            cache,
            clock,
        }
    }

    async fn login(&self, mobile: &str) -> TokenPair {
        self.state
            .sessions
            .login(&LoginRequest::with_mobile(mobile))
            .await
            .unwrap()
    }

    async fn verify(&self, access_token: &str) -> AuthResult<Subject> {
        let header = format!("Bearer {access_token}");
        self.state.gate.verify(Some(&header)).await
    }
}

#[tokio::test]
async fn issued_token_verifies_to_the_same_subject() {
    let h = Harness::new();
    let pair = h.login("13800000000").await;

    let subject = assert_ok!(h.verify(&pair.access_token).await);
    assert_eq!(
        subject,
        Subject::new("13800000000").with_attribute("mobile", "13800000000")
    );
}

#[tokio::test]
async fn cache_ttl_trails_token_lifetime_by_safety_margin() {
    let h = Harness::new();
    let pair = h.login("1").await;

    let claims: AccessClaims = TokenCodec::from_secret(SECRET.as_bytes())
        .verify(&pair.access_token)
        .unwrap();
    let token_left = claims.remaining_seconds(h.clock.now());
    let cache_left = h.cache.remaining_ttl("user:1").unwrap().whole_seconds();

    assert_eq!(token_left - cache_left, 300);
    assert!(cache_left < token_left);
}

#[tokio::test]
async fn removed_cache_entry_revokes_unexpired_token() {
    let h = Harness::new();
    let pair = h.login("1").await;
    assert_ok!(h.verify(&pair.access_token).await);

    h.cache.invalidate("user:1").await.unwrap();

    let err = assert_err!(h.verify(&pair.access_token).await);
    assert!(matches!(err, AuthError::AuthFailed { .. }));
}

#[tokio::test]
async fn cache_expiry_precedes_token_expiry() {
    let h = Harness::new();
    let pair = h.login("1").await;

    // Past the cache TTL, still inside the token's own lifetime.
    h.clock.advance(Duration::days(7) - Duration::seconds(299));
    let err = assert_err!(h.verify(&pair.access_token).await);
    assert!(matches!(err, AuthError::AuthFailed { .. }));

    // Refresh is bounded by the same entry.
    let err = assert_err!(h.state.sessions.refresh(&pair.refresh_token).await);
    assert!(matches!(err, AuthError::InvalidToken { .. }));
}

#[tokio::test]
async fn role_without_credential_fails_authentication() {
    let h = Harness::new();
    h.login("1").await;

    let err = assert_err!(h.state.gate.verify(Some("token")).await);
    assert!(matches!(err, AuthError::AuthFailed { .. }));
}

#[tokio::test]
async fn missing_header_is_not_an_auth_failure() {
    let h = Harness::new();
    let err = assert_err!(h.state.gate.verify(None).await);
    assert!(matches!(err, AuthError::MissingAuthorization));
    assert_eq!(err.code(), None);
}

#[tokio::test]
async fn refresh_returns_new_verifiable_pair() {
    let h = Harness::new();
    let first = h.login("1").await;

    h.clock.advance(Duration::hours(1));
    let second = assert_ok!(h.state.sessions.refresh(&first.refresh_token).await);

    assert_ne!(second.access_token, first.access_token);
    assert_ok!(h.verify(&second.access_token).await);

    // The refresh re-bound the session window from the new issuance time.
    let cache_left = h.cache.remaining_ttl("user:1").unwrap();
    assert_eq!(cache_left, Duration::days(7) - Duration::seconds(300));
}

#[tokio::test]
async fn refresh_without_cache_entry_is_invalid_token() {
    let h = Harness::new();
    let pair = h.login("1").await;
    h.cache.invalidate("user:1").await.unwrap();

    let err = assert_err!(h.state.sessions.refresh(&pair.refresh_token).await);
    assert!(matches!(err, AuthError::InvalidToken { .. }));
}

#[tokio::test]
async fn refresh_token_without_fingerprint_is_invalid_token() {
    let h = Harness::new();
    h.login("1").await;

    let bare = TokenCodec::from_secret(SECRET.as_bytes())
        .sign(&RefreshClaims {
            sub: "1".to_string(),
            fingerprint: None,
        })
        .unwrap();

    let err = assert_err!(h.state.sessions.refresh(&bare).await);
    assert!(matches!(err, AuthError::InvalidToken { .. }));
}

#[tokio::test]
async fn refresh_token_with_empty_fingerprint_is_invalid_token() {
    let h = Harness::new();
    h.login("1").await;

    let blank = TokenCodec::from_secret(SECRET.as_bytes())
        .sign(&RefreshClaims {
            sub: "1".to_string(),
            fingerprint: Some(String::new()),
        })
        .unwrap();

    let err = assert_err!(h.state.sessions.refresh(&blank).await);
    assert!(matches!(err, AuthError::InvalidToken { .. }));
}

#[tokio::test]
async fn access_token_with_zero_iat_fails_authentication() {
    let h = Harness::new();
    h.login("1").await;

    let mut claims = AccessClaims::new("1", h.clock.now(), Duration::hours(1)).unwrap();
    claims.iat = Some(0);
    let token = TokenCodec::from_secret(SECRET.as_bytes())
        .sign(&claims)
        .unwrap();

    let err = assert_err!(h.verify(&token).await);
    assert!(matches!(err, AuthError::AuthFailed { .. }));
}

#[tokio::test]
async fn oversized_lifetime_is_rejected_at_configuration() {
    let mut config = AuthConfig::with_secret(SECRET);
    config.access_token_lifetime = std::time::Duration::from_secs(400_000 * 365 * 24 * 3600);
    assert!(config.validate().is_err());

    let clock = Arc::new(ManualClock::new(datetime!(2024-06-01 12:00 UTC)));
    let cache = Arc::new(LocalIdentityCache::new(clock.clone()));
    let result = AuthState::from_config(&config, cache, clock, Arc::new(MobileSubjectResolver));
    assert!(matches!(result, Err(AuthError::Configuration { .. })));
}

#[tokio::test]
async fn login_requires_mobile() {
    let h = Harness::new();

    for request in [LoginRequest::default(), LoginRequest::with_mobile("")] {
        let err = assert_err!(h.state.sessions.login(&request).await);
        assert!(matches!(err, AuthError::InvalidAccount { .. }));
    }

    assert_ok!(h.state.sessions.login(&LoginRequest::with_mobile("9")).await);
}

/// The fingerprint is checked for presence only. A refresh token from an
/// earlier pairing keeps working as long as the subject's entry is live.
#[tokio::test]
async fn superseded_refresh_token_is_still_accepted() {
    let h = Harness::new();
    let first = h.login("1").await;

    h.clock.advance(Duration::minutes(1));
    let _second = h.state.sessions.refresh(&first.refresh_token).await.unwrap();

    h.clock.advance(Duration::minutes(1));
    assert_ok!(h.state.sessions.refresh(&first.refresh_token).await);

    // A second login also leaves the first pair's refresh token usable.
    let _relogin = h.login("1").await;
    assert_ok!(h.state.sessions.refresh(&first.refresh_token).await);
}

/// Refreshes for one subject are not serialized: both succeed and the last
/// cache write decides the session window.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_refreshes_all_succeed() {
    let h = Harness::new();
    let pair = h.login("1").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let sessions = h.state.sessions.clone();
        let refresh_token = pair.refresh_token.clone();
        handles.push(tokio::spawn(async move {
            sessions.refresh(&refresh_token).await
        }));
    }

    let mut access_tokens = Vec::new();
    for handle in handles {
        let pair = assert_ok!(handle.await.unwrap());
        access_tokens.push(pair.access_token);
    }

    for token in &access_tokens {
        assert_ok!(h.verify(token).await);
    }
    access_tokens.sort();
    access_tokens.dedup();
    assert_eq!(access_tokens.len(), 8);
    assert_eq!(h.cache.stats().size, 1);
}

#[tokio::test]
async fn subjects_are_isolated() {
    let h = Harness::new();
    let a = h.login("a").await;
    let b = h.login("b").await;

    h.cache.invalidate("user:a").await.unwrap();

    assert_err!(h.verify(&a.access_token).await);
    let subject = assert_ok!(h.verify(&b.access_token).await);
    assert_eq!(subject.id, "b");
}
