//! Session middleware and subject extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware::from_fn_with_state, routing::get};
//! use keystile_auth::middleware::{CurrentSubject, session_middleware};
//!
//! async fn me(CurrentSubject(subject): CurrentSubject) -> String {
//!     subject.id
//! }
//!
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .route_layer(from_fn_with_state(auth_state.clone(), session_middleware))
//!     .with_state(auth_state);
//! ```

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderMap, Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AuthError;
use crate::types::Subject;

use super::state::AuthState;

/// Runs the verification gate on every request it wraps.
///
/// On success the resolved [`Subject`] is stored in the request extensions
/// for downstream handlers (see [`CurrentSubject`]). On failure the request
/// is answered with the error response and never reaches the handler.
pub async fn session_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header = match authorization_header(req.headers()) {
        Ok(header) => header,
        Err(e) => return e.into_response(),
    };

    match state.gate.verify(header).await {
        Ok(subject) => {
            tracing::debug!(subject = %subject.id, path = %req.uri().path(), "Request authenticated");
            req.extensions_mut().insert(subject);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Reads the `Authorization` header as text.
///
/// A header that is present but not visible ASCII is an authentication
/// failure, not a missing header.
pub(crate) fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    headers
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AuthError::auth_failed("Authorization header is not valid text"))
        })
        .transpose()
}

/// Extractor for the subject resolved by [`session_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentSubject(pub Subject);

impl<S> FromRequestParts<S> for CurrentSubject
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Subject>()
            .cloned()
            .map(CurrentSubject)
            .ok_or_else(|| AuthError::internal("session middleware is not installed"))
    }
}
