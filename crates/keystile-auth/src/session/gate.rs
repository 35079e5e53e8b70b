//! Access token verification.

use std::sync::Arc;

use crate::AuthResult;
use crate::cache::{IdentityCache, cache_key};
use crate::clock::Clock;
use crate::error::AuthError;
use crate::session::SessionIssuer;
use crate::session::authorization::Authorization;
use crate::token::{AccessClaims, TokenCodec};
use crate::types::Subject;

/// Per-request access token check.
///
/// Stateless between calls: the only state that matters is whether the
/// subject still has a live identity cache entry. The token's own `exp`
/// is a secondary check.
pub struct VerificationGate {
    codec: TokenCodec,
    cache: Arc<dyn IdentityCache>,
    clock: Arc<dyn Clock>,
}

impl VerificationGate {
    /// Creates a gate.
    pub fn new(codec: TokenCodec, cache: Arc<dyn IdentityCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            codec,
            cache,
            clock,
        }
    }

    /// Creates a gate sharing the issuer's codec, cache and clock.
    pub fn for_issuer(issuer: &SessionIssuer) -> Self {
        Self::new(
            issuer.codec().clone(),
            Arc::clone(issuer.cache()),
            Arc::clone(issuer.clock()),
        )
    }

    /// Verifies a raw `Authorization` header value and resolves its subject.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingAuthorization` if the header is absent or empty
    /// - `AuthError::AuthFailed` if the credential is missing or does not
    ///   decode, if it is expired or lacks `iat`, or if its subject has no
    ///   live cache entry
    /// - `AuthError::Storage` if the cache cannot be read
    pub async fn verify(&self, authorization: Option<&str>) -> AuthResult<Subject> {
        let header = match authorization {
            Some(header) if !header.is_empty() => header,
            _ => return Err(AuthError::MissingAuthorization),
        };

        let credential = Authorization::parse(header)
            .credential
            .ok_or_else(|| AuthError::auth_failed("missing credential"))?;

        let claims: AccessClaims = self.codec.verify(credential).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected by codec");
            AuthError::auth_failed("invalid access token")
        })?;

        let subject = self.cache.get(&cache_key(&claims.sub)).await?;
        let now = self.clock.now();

        // An `iat` of zero counts as missing.
        let issued = matches!(claims.iat, Some(iat) if iat != 0);

        match subject {
            Some(subject) if issued && !claims.is_expired_at(now) => Ok(subject),
            Some(_) if !issued => Err(AuthError::auth_failed("token has no iat")),
            Some(_) => Err(AuthError::auth_failed("token expired")),
            None => {
                tracing::debug!(subject = %claims.sub, "No live session for subject");
                Err(AuthError::auth_failed("session not found"))
            }
        }
    }
}
