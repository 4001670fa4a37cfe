//! Identity claims bound into a signed token
//!
//! A claims payload is an email address plus any number of caller supplied
//! fields. The email is the only field the strategies depend on, so it is kept
//! as a typed field while the remainder stays an opaque JSON map:
//!
//! | Field   | Type                          | Description                                  |
//! | ------- | ----------------------------- | -------------------------------------------- |
//! | `email` | `String`                      | The email address the token is issued for.   |
//! | `extra` | `Map<String, serde_json::Value>` | Additional claims, serialized next to `email`. |
//!
//! ```rust
//! use sesame_core::Claims;
//! use serde_json::json;
//!
//! let claims = Claims::new("user@example.com").with_claim("redirect", "/dashboard");
//! assert_eq!(claims.get("redirect"), Some(&json!("/dashboard")));
//!
//! let from_json = Claims::try_from(json!({ "email": "user@example.com", "plan": "pro" })).unwrap();
//! assert_eq!(from_json.email, "user@example.com");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// A claims payload: a required email plus opaque extension fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The email address the claims are about.
    pub email: String,

    /// Every other claim supplied by the caller.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }

    /// Add an extra claim, replacing any previous value under the same key
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Remove the given keys from the extra claims, returning the ones that were present
    pub fn strip_reserved(&mut self, reserved: &[&str]) -> Vec<String> {
        reserved
            .iter()
            .filter_map(|key| self.extra.remove(*key).map(|_| key.to_string()))
            .collect()
    }
}

impl TryFrom<Value> for Claims {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut map) = value else {
            return Err(ValidationError::InvalidField(
                "claims must be a JSON object".to_string(),
            ));
        };

        let email = match map.remove("email") {
            Some(Value::String(email)) => email,
            Some(_) => {
                return Err(ValidationError::InvalidField(
                    "email must be a string".to_string(),
                ));
            }
            None => return Err(ValidationError::MissingField("email".to_string())),
        };

        Ok(Self { email, extra: map })
    }
}

impl From<Claims> for Value {
    fn from(claims: Claims) -> Self {
        let mut map = claims.extra;
        map.insert("email".to_string(), Value::String(claims.email));
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claims_builder() {
        let claims = Claims::new("a@b.com")
            .with_claim("name", "Alice")
            .with_claim("admin", true);

        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.get("name"), Some(&json!("Alice")));
        assert_eq!(claims.get("admin"), Some(&json!(true)));
        assert_eq!(claims.get("missing"), None);
    }

    #[test]
    fn test_claims_serialize_flattened() {
        let claims = Claims::new("a@b.com").with_claim("org", json!({ "id": 7 }));
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value, json!({ "email": "a@b.com", "org": { "id": 7 } }));

        let back: Claims = serde_json::from_value(value).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_try_from_value() {
        let claims = Claims::try_from(json!({ "email": "a@b.com", "tags": ["x", "y"] })).unwrap();
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.get("tags"), Some(&json!(["x", "y"])));
        assert!(claims.get("email").is_none());
    }

    #[test]
    fn test_try_from_value_missing_email() {
        let err = Claims::try_from(json!({ "name": "Alice" })).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("email".to_string()));
    }

    #[test]
    fn test_try_from_value_rejects_bad_shapes() {
        assert!(matches!(
            Claims::try_from(json!({ "email": 42 })),
            Err(ValidationError::InvalidField(_))
        ));
        assert!(matches!(
            Claims::try_from(json!("a@b.com")),
            Err(ValidationError::InvalidField(_))
        ));
    }

    #[test]
    fn test_into_value() {
        let value: Value = Claims::new("a@b.com").with_claim("n", 1).into();
        assert_eq!(value, json!({ "email": "a@b.com", "n": 1 }));
    }

    #[test]
    fn test_strip_reserved() {
        let mut claims = Claims::new("a@b.com")
            .with_claim("tokenId", "forged")
            .with_claim("exp", 0)
            .with_claim("keep", "me");

        let mut stripped = claims.strip_reserved(&["tokenId", "iat", "exp"]);
        stripped.sort();

        assert_eq!(stripped, vec!["exp".to_string(), "tokenId".to_string()]);
        assert_eq!(claims.extra.len(), 1);
        assert_eq!(claims.get("keep"), Some(&json!("me")));
    }
}
