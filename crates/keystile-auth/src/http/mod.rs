//! HTTP handlers.

pub mod token;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

pub use token::token_handler;

/// Success envelope: `{"code": 0, "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Always `0` on success.
    pub code: u32,
    /// Response payload.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wraps a successful payload.
    pub fn ok(data: T) -> Self {
        Self { code: 0, data }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
