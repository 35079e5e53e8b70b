//! Shared state for the session middleware and token endpoint.

use std::sync::Arc;

use crate::AuthResult;
use crate::cache::IdentityCache;
use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::session::{SessionIssuer, SessionService, SubjectResolver, VerificationGate};
use crate::token::TokenCodec;

/// State required for session authentication.
///
/// Include it in your application state and expose it with `FromRef`:
///
/// ```ignore
/// #[derive(Clone)]
/// struct AppState {
///     auth: AuthState,
/// }
///
/// impl FromRef<AppState> for AuthState {
///     fn from_ref(state: &AppState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthState {
    /// Access token check run ahead of protected routes.
    pub gate: Arc<VerificationGate>,

    /// Login and refresh front door.
    pub sessions: Arc<SessionService>,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(gate: Arc<VerificationGate>, sessions: Arc<SessionService>) -> Self {
        Self { gate, sessions }
    }

    /// Wires the codec, issuer, gate and session service from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if `config` does not validate.
    pub fn from_config(
        config: &AuthConfig,
        cache: Arc<dyn IdentityCache>,
        clock: Arc<dyn Clock>,
        resolver: Arc<dyn SubjectResolver>,
    ) -> AuthResult<Self> {
        let codec = TokenCodec::from_secret(config.token_secret.as_bytes());
        let issuer = Arc::new(SessionIssuer::new(config, codec, cache, clock)?);
        let gate = Arc::new(VerificationGate::for_issuer(&issuer));
        let sessions = Arc::new(SessionService::new(issuer, resolver));

        Ok(Self::new(gate, sessions))
    }
}
