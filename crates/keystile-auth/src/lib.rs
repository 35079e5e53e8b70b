//! # keystile-auth
//!
//! Token-based session authentication with cache-bound revocation.
//!
//! This crate provides:
//! - Signed access/refresh token pairs (HS256)
//! - A TTL identity cache that decides whether a session is still live
//! - Per-request access token verification
//! - Refresh token rotation
//! - Axum middleware and a token endpoint handler
//!
//! ## Overview
//!
//! Issuing a session caches the subject under `"user:" + id` for the access
//! token's lifetime minus a safety margin. Verification and refresh both
//! require that entry to be live, so removing or expiring it revokes every
//! outstanding token for the subject before the tokens themselves expire.
//!
//! ## Modules
//!
//! - [`config`] - Session configuration
//! - [`token`] - Token payloads and the signing codec
//! - [`cache`] - Identity cache contract and in-memory implementation
//! - [`clock`] - Injectable time source
//! - [`session`] - Issuance, verification, refresh and login dispatch
//! - [`middleware`] - HTTP middleware and error responses
//! - [`http`] - Axum HTTP handlers

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod session;
pub mod token;
pub mod types;

pub use cache::{CacheStats, IdentityCache, LocalIdentityCache, cache_key};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, ErrorCategory, ErrorCode};
pub use http::{Envelope, token_handler};
pub use middleware::{AuthState, CurrentSubject, session_middleware};
pub use session::{
    MobileSubjectResolver, RefreshRotator, SessionIssuer, SessionService, SubjectResolver,
    VerificationGate,
};
pub use token::{AccessClaims, CodecError, RefreshClaims, TokenCodec};
pub use types::{LoginRequest, Subject, TokenPair};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use keystile_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::cache::{CacheStats, IdentityCache, LocalIdentityCache};
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::config::AuthConfig;
    pub use crate::error::{AuthError, ErrorCode};
    pub use crate::middleware::{AuthState, CurrentSubject, session_middleware};
    pub use crate::session::{SessionService, SubjectResolver, VerificationGate};
    pub use crate::types::{LoginRequest, Subject, TokenPair};
}
