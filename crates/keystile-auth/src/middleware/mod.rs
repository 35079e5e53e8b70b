//! HTTP middleware for session authentication.
//!
//! - [`session_middleware`]: runs the verification gate ahead of protected routes
//! - [`CurrentSubject`]: extractor for the subject the gate resolved
//! - [`AuthState`]: shared state for the middleware and token endpoint
//! - `IntoResponse` for [`AuthError`](crate::error::AuthError): wire error format

pub mod error;
pub mod session;
pub mod state;

pub use session::{CurrentSubject, session_middleware};
pub use state::AuthState;
