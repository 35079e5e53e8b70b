//! Access and refresh token payloads.
//!
//! The two payloads are distinct record types. Decoding into either one
//! ignores unknown fields, and a token of one kind presented as the other
//! fails on the fields it lacks (`exp` for access, the fingerprint for
//! refresh) instead of silently passing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Access token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject identifier.
    pub sub: String,

    /// Issued at (Unix timestamp, seconds).
    ///
    /// Optional on the wire so that a token lacking it decodes and is then
    /// rejected by the verification gate with the proper error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp, seconds).
    pub exp: i64,

    /// Unique token id. Keeps two tokens minted for one subject within the
    /// same second distinct.
    #[serde(default)]
    pub jti: String,
}

impl AccessClaims {
    /// Builds claims for `subject_id` issued at `issued_at` and valid for `lifetime`.
    ///
    /// Returns `None` if the expiry falls outside the representable date range.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        issued_at: OffsetDateTime,
        lifetime: Duration,
    ) -> Option<Self> {
        let expires_at = issued_at.checked_add(lifetime)?;
        Some(Self {
            sub: subject_id.into(),
            iat: Some(issued_at.unix_timestamp()),
            exp: expires_at.unix_timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Returns `true` if the token is expired at `now` (`exp <= now`).
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.exp <= now.unix_timestamp()
    }

    /// Seconds left until expiry, measured from `now`. Negative once expired.
    #[must_use]
    pub fn remaining_seconds(&self, now: OffsetDateTime) -> i64 {
        self.exp - now.unix_timestamp()
    }
}

/// Refresh token payload.
///
/// Carries no expiry of its own: a refresh token stays usable exactly as
/// long as its subject has a live identity cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Subject identifier.
    pub sub: String,

    /// One-way hash of the access token minted alongside this refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl RefreshClaims {
    /// Builds refresh claims paired with `access_token`.
    #[must_use]
    pub fn paired_with(subject_id: impl Into<String>, access_token: &str) -> Self {
        Self {
            sub: subject_id.into(),
            fingerprint: Some(fingerprint(access_token)),
        }
    }
}

/// Hashes a token with SHA-256, hex encoded.
#[must_use]
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
