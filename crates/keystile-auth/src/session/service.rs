//! Login and refresh dispatch for the token endpoint.

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::session::authorization::Authorization;
use crate::session::{RefreshRotator, SessionIssuer, SubjectResolver};
use crate::types::{LoginRequest, TokenPair};

/// Front door for obtaining token pairs.
///
/// A request either logs in with a mobile identifier or presents a refresh
/// token under the `token` role. Both paths end in the [`SessionIssuer`].
pub struct SessionService {
    issuer: Arc<SessionIssuer>,
    rotator: RefreshRotator,
    resolver: Arc<dyn SubjectResolver>,
}

impl SessionService {
    /// Creates a service that resolves login subjects with `resolver`.
    pub fn new(issuer: Arc<SessionIssuer>, resolver: Arc<dyn SubjectResolver>) -> Self {
        Self {
            rotator: RefreshRotator::new(Arc::clone(&issuer)),
            issuer,
            resolver,
        }
    }

    /// Logs in with the mobile identifier from `request`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidAccount` if `mobile` is missing or empty.
    /// Resolver and issuance failures propagate unchanged.
    pub async fn login(&self, request: &LoginRequest) -> AuthResult<TokenPair> {
        let mobile = request
            .mobile
            .as_deref()
            .filter(|mobile| !mobile.is_empty())
            .ok_or_else(|| AuthError::invalid_account("mobile is required"))?;

        let subject = self.resolver.resolve(mobile).await?;
        let subject_id = subject.id.clone();
        let pair = self.issuer.issue(subject).await?;

        tracing::info!(subject = %subject_id, "Session created");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// # Errors
    ///
    /// See [`RefreshRotator::rotate`].
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        self.rotator.rotate(refresh_token).await
    }

    /// Dispatches a token request.
    ///
    /// An `Authorization` header with the `token` role (any case) followed by
    /// a separator is a refresh. Anything else, including no header, is a
    /// login with `request`.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidToken` for a refresh that fails, and
    /// `AuthError::InvalidAccount` for a login without a mobile identifier.
    pub async fn exchange(
        &self,
        authorization: Option<&str>,
        request: &LoginRequest,
    ) -> AuthResult<TokenPair> {
        match authorization.map(Authorization::parse) {
            Some(auth) if auth.is_refresh() => {
                self.refresh(auth.credential.unwrap_or_default()).await
            }
            _ => self.login(request).await,
        }
    }
}
