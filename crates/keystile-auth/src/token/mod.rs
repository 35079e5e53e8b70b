//! Token payloads and the signing codec.
//!
//! - [`claims`]: access and refresh payload records, plus the access token fingerprint
//! - [`codec`]: HS256 signing and signature-only verification

pub mod claims;
pub mod codec;

pub use claims::{AccessClaims, RefreshClaims, fingerprint};
pub use codec::{CodecError, TokenCodec};
