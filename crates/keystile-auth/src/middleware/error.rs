//! Error response handling.
//!
//! Every error in the authentication taxonomy is rendered as
//!
//! ```json
//! {"errors": [{"code": 77001, "message": "AUTH_FAILED"}]}
//! ```
//!
//! A missing `Authorization` header sits outside the taxonomy and is answered
//! with a bare `400 Bad Request`.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{AuthError, ErrorCode};

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let Some(code) = self.code() else {
            tracing::debug!("Request rejected: missing Authorization header");
            return StatusCode::BAD_REQUEST.into_response();
        };

        let status = status_for(code);
        if self.is_server_error() {
            tracing::error!(category = %self.category(), error = %self, "Auth request failed");
        } else {
            tracing::debug!(category = %self.category(), error = %self, "Auth request rejected");
        }

        let body = json!({
            "errors": [{
                "code": code.as_u32(),
                "message": code.as_str(),
            }]
        });

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"keystile\""),
            );
        }
        response
    }
}

/// HTTP status for a symbolic error code.
fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::AuthFailed | ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
        ErrorCode::InvalidAccount => StatusCode::BAD_REQUEST,
        ErrorCode::SystemError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
