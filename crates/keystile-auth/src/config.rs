//! Session configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! token_secret = "change-me"
//! access_token_lifetime = "7d"
//! cache_safety_margin = "5m"
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Token issuance and verification settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HMAC secret used to sign and verify every token.
    /// Changing it invalidates all outstanding tokens.
    pub token_secret: String,

    /// Lifetime of an access token.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Amount subtracted from the access token lifetime to obtain the
    /// identity cache TTL, so the cache entry expires before the token does.
    #[serde(with = "humantime_serde")]
    pub cache_safety_margin: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            access_token_lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
            cache_safety_margin: Duration::from_secs(300),             // 5 minutes
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("cache_safety_margin", &self.cache_safety_margin)
            .finish()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Creates a configuration with the given secret and default lifetimes.
    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            token_secret: secret.into(),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token secret is empty, and
    /// `ConfigError::InvalidValue` if the access token lifetime is not
    /// strictly greater than the cache safety margin or puts token expiry
    /// beyond the representable date range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_secret.is_empty() {
            return Err(ConfigError::Missing("auth.token_secret".to_string()));
        }

        if self.access_token_lifetime <= self.cache_safety_margin {
            return Err(ConfigError::InvalidValue(format!(
                "access_token_lifetime ({:?}) must be greater than cache_safety_margin ({:?})",
                self.access_token_lifetime, self.cache_safety_margin
            )));
        }

        let expiry = time::Duration::try_from(self.access_token_lifetime)
            .ok()
            .and_then(|lifetime| time::OffsetDateTime::now_utc().checked_add(lifetime));
        if expiry.is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "access_token_lifetime ({:?}) is too large",
                self.access_token_lifetime
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(604_800));
        assert_eq!(config.cache_safety_margin, Duration::from_secs(300));
        assert!(config.token_secret.is_empty());
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let err = AuthConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("token_secret"));
    }

    #[test]
    fn test_with_secret_validates() {
        assert!(AuthConfig::with_secret("s3cret").validate().is_ok());
    }

    #[test]
    fn test_lifetime_must_exceed_margin() {
        let mut config = AuthConfig::with_secret("s3cret");
        config.access_token_lifetime = Duration::from_secs(300);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("cache_safety_margin"));

        config.access_token_lifetime = Duration::from_secs(301);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_humantime_deserialization() {
        let config: AuthConfig = serde_json::from_str(
            r#"{"token_secret":"x","access_token_lifetime":"1h","cache_safety_margin":"30s"}"#,
        )
        .unwrap();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.cache_safety_margin, Duration::from_secs(30));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", AuthConfig::with_secret("super-secret-value"));
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("redacted"));
    }
}
