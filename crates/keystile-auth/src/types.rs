//! Domain types shared across issuance, verification and refresh.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The authenticated identity bound to a session.
///
/// Only `id` is required. Any further fields handed to the issuer are kept
/// as `attributes` and cached verbatim; verification returns exactly what
/// was cached, it never re-reads an identity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Opaque unique identifier.
    pub id: String,

    /// Additional identity fields captured at issuance.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Subject {
    /// Creates a subject with no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Key reserved for the flattened subject identifier.
    pub const ID_KEY: &'static str = "id";

    /// Adds an attribute. An `id` attribute is ignored, since it would
    /// collide with the identifier once flattened.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != Self::ID_KEY {
            self.attributes.insert(key, value.into());
        }
        self
    }

    /// Gets an attribute value by key.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A freshly minted access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Signed access token presented on every protected request.
    pub access_token: String,

    /// Signed refresh token exchanged for a new pair.
    pub refresh_token: String,
}

/// Login request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Mobile number identifying the account.
    #[serde(default)]
    pub mobile: Option<String>,
}

impl LoginRequest {
    /// Creates a login request for the given mobile number.
    #[must_use]
    pub fn with_mobile(mobile: impl Into<String>) -> Self {
        Self {
            mobile: Some(mobile.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subject_keeps_extra_fields() {
        let subject: Subject =
            serde_json::from_value(json!({"id": "42", "name": "Ada", "level": 3})).unwrap();
        assert_eq!(subject.id, "42");
        assert_eq!(subject.get_attribute("name"), Some(&json!("Ada")));
        assert_eq!(subject.get_attribute("level"), Some(&json!(3)));

        let back = serde_json::to_value(&subject).unwrap();
        assert_eq!(back, json!({"id": "42", "name": "Ada", "level": 3}));
    }

    #[test]
    fn test_id_attribute_is_ignored() {
        let subject = Subject::new("1").with_attribute("id", "other").with_attribute("a", 1);
        assert!(subject.get_attribute("id").is_none());

        let json = serde_json::to_string(&subject).unwrap();
        let back: Subject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, subject);
    }

    #[test]
    fn test_token_pair_is_camel_case() {
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json, json!({"accessToken": "a", "refreshToken": "r"}));
    }

    #[test]
    fn test_login_request_tolerates_missing_mobile() {
        let req: LoginRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.mobile.is_none());

        let req: LoginRequest =
            serde_json::from_value(json!({"mobile": "13800000000", "extra": true})).unwrap();
        assert_eq!(req.mobile.as_deref(), Some("13800000000"));
    }
}
