//! Authentication error types.
//!
//! This module defines the error taxonomy raised by session issuance,
//! verification and refresh. The core only raises symbolic conditions;
//! turning them into wire responses is done by the HTTP layer
//! (see [`crate::middleware::error`]).

use std::fmt;

/// Errors that can occur while issuing, verifying or refreshing sessions.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The `Authorization` header is absent altogether.
    ///
    /// This is a malformed call rather than an authentication failure and
    /// is answered with a plain bad request.
    #[error("Missing Authorization header")]
    MissingAuthorization,

    /// The access token is missing, invalid or expired, or its subject has
    /// no live identity cache entry.
    #[error("Authentication failed: {message}")]
    AuthFailed {
        /// Description of why authentication failed.
        message: String,
    },

    /// The refresh token is malformed or unusable, or its subject has no
    /// live identity cache entry.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// A login was attempted without a usable account identifier.
    #[error("Invalid account: {message}")]
    InvalidAccount {
        /// Description of why the account is invalid.
        message: String,
    },

    /// The identity cache could not be read or written.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `AuthFailed` error.
    #[must_use]
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::AuthFailed {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidAccount` error.
    #[must_use]
    pub fn invalid_account(message: impl Into<String>) -> Self {
        Self::InvalidAccount {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the symbolic error code for this error.
    ///
    /// `None` for [`AuthError::MissingAuthorization`], which sits outside the
    /// authentication taxonomy.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::MissingAuthorization => None,
            Self::AuthFailed { .. } => Some(ErrorCode::AuthFailed),
            Self::InvalidToken { .. } => Some(ErrorCode::InvalidToken),
            Self::InvalidAccount { .. } => Some(ErrorCode::InvalidAccount),
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                Some(ErrorCode::SystemError)
            }
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingAuthorization
                | Self::AuthFailed { .. }
                | Self::InvalidToken { .. }
                | Self::InvalidAccount { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingAuthorization => ErrorCategory::Protocol,
            Self::AuthFailed { .. } => ErrorCategory::Authentication,
            Self::InvalidToken { .. } => ErrorCategory::Token,
            Self::InvalidAccount { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Symbolic error codes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// Unexpected failure inside the service.
    SystemError = 77000,
    /// Access token rejected.
    AuthFailed = 77001,
    /// Login without a usable account identifier.
    InvalidAccount = 77002,
    /// Refresh token rejected.
    InvalidToken = 77003,
}

impl ErrorCode {
    /// Numeric value of the code.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Symbolic name of the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SystemError => "SYSTEM_ERROR",
            Self::AuthFailed => "AUTH_FAILED",
            Self::InvalidAccount => "INVALID_ACCOUNT",
            Self::InvalidToken => "INVALID_TOKEN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Categories of authentication errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed request outside the auth taxonomy.
    Protocol,
    /// Access token verification failures.
    Authentication,
    /// Refresh token failures.
    Token,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol => write!(f, "protocol"),
            Self::Authentication => write!(f, "authentication"),
            Self::Token => write!(f, "token"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::auth_failed("subject not cached");
        assert_eq!(err.to_string(), "Authentication failed: subject not cached");

        let err = AuthError::invalid_token("missing fingerprint");
        assert_eq!(err.to_string(), "Invalid token: missing fingerprint");

        let err = AuthError::MissingAuthorization;
        assert_eq!(err.to_string(), "Missing Authorization header");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AuthError::auth_failed("x").code(),
            Some(ErrorCode::AuthFailed)
        );
        assert_eq!(
            AuthError::invalid_token("x").code(),
            Some(ErrorCode::InvalidToken)
        );
        assert_eq!(
            AuthError::invalid_account("x").code(),
            Some(ErrorCode::InvalidAccount)
        );
        assert_eq!(AuthError::storage("x").code(), Some(ErrorCode::SystemError));
        assert_eq!(AuthError::MissingAuthorization.code(), None);

        assert_eq!(ErrorCode::SystemError.as_u32(), 77000);
        assert_eq!(ErrorCode::AuthFailed.as_u32(), 77001);
        assert_eq!(ErrorCode::InvalidAccount.as_u32(), 77002);
        assert_eq!(ErrorCode::InvalidToken.as_u32(), 77003);
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::MissingAuthorization.is_client_error());
        assert!(AuthError::auth_failed("x").is_client_error());
        assert!(!AuthError::auth_failed("x").is_server_error());
        assert!(AuthError::storage("down").is_server_error());
        assert!(!AuthError::storage("down").is_client_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::MissingAuthorization.category(),
            ErrorCategory::Protocol
        );
        assert_eq!(
            AuthError::auth_failed("x").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(AuthError::invalid_token("x").category(), ErrorCategory::Token);
        assert_eq!(ErrorCategory::Protocol.to_string(), "protocol");
        assert_eq!(ErrorCode::AuthFailed.to_string(), "AUTH_FAILED");
    }
}
