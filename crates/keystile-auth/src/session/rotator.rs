//! Refresh token rotation.

use std::sync::Arc;

use crate::AuthResult;
use crate::cache::cache_key;
use crate::error::AuthError;
use crate::session::SessionIssuer;
use crate::token::RefreshClaims;
use crate::types::TokenPair;

/// Exchanges a refresh token for a new token pair.
///
/// The refresh token's fingerprint is only required to be present. It is
/// not compared with the access token it was minted alongside, so any
/// validly signed refresh token for a subject with a live cache entry is
/// accepted, including one from an earlier pairing.
///
/// Concurrent rotations for the same subject are not serialized. Each one
/// issues a pair and the last cache write wins.
pub struct RefreshRotator {
    issuer: Arc<SessionIssuer>,
}

impl RefreshRotator {
    /// Creates a rotator that mints through `issuer`.
    pub fn new(issuer: Arc<SessionIssuer>) -> Self {
        Self { issuer }
    }

    /// Validates `refresh_token` against the cache and issues a replacement pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token does not decode, has an
    /// absent or empty fingerprint, or its subject has no live cache entry. Cache and
    /// issuance failures propagate unchanged.
    pub async fn rotate(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims: RefreshClaims = self.issuer.codec().verify(refresh_token).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected by codec");
            AuthError::invalid_token("invalid refresh token")
        })?;

        if claims.fingerprint.as_deref().is_none_or(str::is_empty) {
            return Err(AuthError::invalid_token("refresh token has no fingerprint"));
        }

        let Some(subject) = self.issuer.cache().get(&cache_key(&claims.sub)).await? else {
            tracing::debug!(subject = %claims.sub, "Refresh for subject without live session");
            return Err(AuthError::invalid_token("session not found"));
        };

        let pair = self.issuer.issue(subject).await?;
        tracing::info!(subject = %claims.sub, "Rotated session tokens");
        Ok(pair)
    }
}
