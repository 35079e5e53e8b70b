//! HS256 signing and verification of token payloads.
//!
//! The codec only checks integrity: signature, structure and payload shape.
//! Time-based validity (`exp`, `iat`) is left to the
//! verification gate, which reads "now" from an injected clock. Refresh
//! tokens carry no `exp` at all, so no registered claim is required.

use std::collections::HashSet;
use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors produced while signing or verifying a token.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The token is not a well-formed JWT, or its payload has the wrong shape.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of what is wrong with the token.
        message: String,
    },

    /// The token was not signed with this codec's secret.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The payload could not be signed.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },
}

impl CodecError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for CodecError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::malformed(err.to_string()),
        }
    }
}

/// Signs and verifies token payloads with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec keyed by `secret`.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Serializes and signs `claims`.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encoding` if the claims cannot be serialized or signed.
    pub fn sign<C: Serialize>(&self, claims: &C) -> Result<String, CodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CodecError::encoding(e.to_string()))
    }

    /// Checks the signature of `token` and decodes its payload.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::InvalidSignature` if the token was signed with a
    /// different secret and `CodecError::Malformed` for anything else that
    /// prevents decoding into `C`.
    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, CodecError> {
        let data = decode::<C>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}
