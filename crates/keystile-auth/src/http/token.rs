//! Token endpoint.
//!
//! `POST /token` logs in with `{"mobile": "..."}` or, when called with
//! `Authorization: token <refresh token>`, rotates the session.

use axum::{body::Bytes, extract::State, http::HeaderMap};

use crate::error::AuthError;
use crate::middleware::AuthState;
use crate::middleware::session::authorization_header;
use crate::types::{LoginRequest, TokenPair};

use super::Envelope;

/// Handles token requests.
///
/// The body is parsed leniently: an empty or unparseable body is treated as
/// a login without a mobile identifier.
pub async fn token_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Envelope<TokenPair>, AuthError> {
    let request = parse_login(&body);
    let authorization = authorization_header(&headers).unwrap_or_default();

    let pair = state.sessions.exchange(authorization, &request).await?;
    Ok(Envelope::ok(pair))
}

fn parse_login(body: &[u8]) -> LoginRequest {
    if body.is_empty() {
        return LoginRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring unparseable token request body");
        LoginRequest::default()
    })
}
