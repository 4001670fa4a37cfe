//! Magic link token codec
//!
//! A token is a compact JWT whose body is the caller's claims with the token
//! envelope fields alongside them:
//!
//! ```json
//! { "email": "a@b.com", "...extra": "...", "tokenId": "…", "iat": 1700000000, "exp": 1700000300 }
//! ```
//!
//! The JWT serialization is URL-safe base64, so a token can be appended to a
//! link as-is.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Header, Validation};
use serde::{Deserialize, Serialize};
use sesame_core::{Algorithm, Claims, CompiledKey, TokenId, VerifyOptions};

use crate::error::MagicLinkError;

/// Claim names owned by the token envelope; callers cannot override them
pub const RESERVED_CLAIMS: &[&str] = &["email", "tokenId", "iat", "exp"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenEnvelope {
    #[serde(rename = "tokenId")]
    pub token_id: TokenId,
    /// Issued at in seconds (as UTC timestamp)
    pub iat: i64,
    /// Expiration time in seconds (as UTC timestamp)
    pub exp: i64,
    #[serde(flatten)]
    pub claims: Claims,
}

impl TokenEnvelope {
    pub fn new(
        claims: Claims,
        token_id: TokenId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            claims,
        }
    }

    pub fn sign(&self, algorithm: Algorithm, key: &CompiledKey) -> Result<String, MagicLinkError> {
        let header = Header::new(algorithm);

        jsonwebtoken::encode(&header, self, key.encoding_key())
            .map_err(|e| MagicLinkError::Signing(format!("Failed to encode JWT: {e}")))
    }

    /// Decode a token and check its signature against the allowed algorithms.
    ///
    /// Freshness is not checked here; see [`TokenEnvelope::check_freshness`].
    pub fn decode(
        token: &str,
        key: &CompiledKey,
        options: &VerifyOptions,
    ) -> Result<Self, MagicLinkError> {
        let Some(first) = options.algorithms.first() else {
            return Err(MagicLinkError::TokenInvalid(
                "no verification algorithm allowed".to_string(),
            ));
        };

        let mut validation = Validation::new(*first);
        validation.algorithms = options.algorithms.clone();
        // exp and iat are checked against the strategy clock instead of the system time
        validation.validate_exp = false;
        // Registered names such as aud and iss are opaque caller claims
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        jsonwebtoken::decode::<TokenEnvelope>(token, key.decoding_key(), &validation)
            .map(|data| data.claims)
            .map_err(|e| MagicLinkError::TokenInvalid(format!("JWT validation failed: {e}")))
    }

    pub fn check_freshness(
        &self,
        now: DateTime<Utc>,
        options: &VerifyOptions,
    ) -> Result<(), MagicLinkError> {
        let now = now.timestamp();
        let leeway = options.leeway.num_seconds();

        if self.iat > now + leeway {
            return Err(MagicLinkError::TokenInvalid(
                "token issued in the future".to_string(),
            ));
        }

        if now > self.exp + leeway {
            return Err(MagicLinkError::TokenExpired);
        }

        if now - self.iat > options.max_age.num_seconds() + leeway {
            return Err(MagicLinkError::TokenExpired);
        }

        Ok(())
    }

    pub fn into_verified(self) -> Result<VerifiedClaims, MagicLinkError> {
        let issued_at = DateTime::from_timestamp(self.iat, 0)
            .ok_or_else(|| MagicLinkError::TokenInvalid("iat out of range".to_string()))?;
        let expires_at = DateTime::from_timestamp(self.exp, 0)
            .ok_or_else(|| MagicLinkError::TokenInvalid("exp out of range".to_string()))?;

        Ok(VerifiedClaims {
            token_id: self.token_id,
            issued_at,
            expires_at,
            claims: self.claims,
        })
    }
}

/// The content of a token whose signature and freshness have been checked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedClaims {
    pub token_id: TokenId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub claims: Claims,
}

impl VerifiedClaims {
    pub fn email(&self) -> &str {
        &self.claims.email
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;
    use sesame_core::SigningKey;

    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_for_magic_link_tokens";

    fn key() -> CompiledKey {
        SigningKey::hmac(TEST_SECRET).compile().unwrap()
    }

    fn envelope(issued_at: DateTime<Utc>) -> TokenEnvelope {
        TokenEnvelope::new(
            Claims::new("a@b.com").with_claim("plan", "pro"),
            TokenId::new("tok-1"),
            issued_at,
            issued_at + Duration::minutes(5),
        )
    }

    #[test]
    fn test_sign_and_decode() {
        let now = Utc::now();
        let token = envelope(now).sign(Algorithm::HS256, &key()).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded = TokenEnvelope::decode(&token, &key(), &VerifyOptions::default()).unwrap();
        assert_eq!(decoded.token_id, TokenId::new("tok-1"));
        assert_eq!(decoded.iat, now.timestamp());
        assert_eq!(decoded.exp, now.timestamp() + 300);
        assert_eq!(decoded.claims.email, "a@b.com");
        assert_eq!(decoded.claims.get("plan"), Some(&json!("pro")));
        // Envelope fields are not leaked into the extra claims
        assert_eq!(decoded.claims.extra.len(), 1);
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = envelope(Utc::now()).sign(Algorithm::HS256, &key()).unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        );
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = envelope(Utc::now()).sign(Algorithm::HS256, &key()).unwrap();
        let other = SigningKey::hmac("another-secret").compile().unwrap();

        let result = TokenEnvelope::decode(&token, &other, &VerifyOptions::default());
        assert!(matches!(result, Err(MagicLinkError::TokenInvalid(_))));
    }

    #[test]
    fn test_decode_rejects_disallowed_algorithm() {
        let token = envelope(Utc::now()).sign(Algorithm::HS512, &key()).unwrap();

        let result = TokenEnvelope::decode(&token, &key(), &VerifyOptions::default());
        assert!(matches!(result, Err(MagicLinkError::TokenInvalid(_))));

        let options = VerifyOptions::default().with_algorithms([Algorithm::HS256, Algorithm::HS512]);
        assert!(TokenEnvelope::decode(&token, &key(), &options).is_ok());
    }

    #[test]
    fn test_decode_rejects_missing_email() {
        #[derive(Serialize)]
        struct NoEmail {
            #[serde(rename = "tokenId")]
            token_id: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let body = NoEmail {
            token_id: "tok-1".to_string(),
            iat: now,
            exp: now + 300,
        };
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &body, key().encoding_key())
                .unwrap();

        let result = TokenEnvelope::decode(&token, &key(), &VerifyOptions::default());
        assert!(matches!(result, Err(MagicLinkError::TokenInvalid(_))));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for token in ["", "abc", "a.b.c", "not.a.jwt.at.all"] {
            let result = TokenEnvelope::decode(token, &key(), &VerifyOptions::default());
            assert!(matches!(result, Err(MagicLinkError::TokenInvalid(_))), "{token}");
        }
    }

    #[test]
    fn test_decode_with_empty_allow_list() {
        let token = envelope(Utc::now()).sign(Algorithm::HS256, &key()).unwrap();
        let options = VerifyOptions::default().with_algorithms([]);

        let result = TokenEnvelope::decode(&token, &key(), &options);
        assert!(matches!(result, Err(MagicLinkError::TokenInvalid(_))));
    }

    #[test]
    fn test_freshness_boundaries() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let envelope = envelope(issued);
        let options = VerifyOptions::default();

        assert!(envelope.check_freshness(issued, &options).is_ok());
        assert!(
            envelope
                .check_freshness(issued + Duration::minutes(5), &options)
                .is_ok()
        );
        assert!(matches!(
            envelope.check_freshness(issued + Duration::seconds(301), &options),
            Err(MagicLinkError::TokenExpired)
        ));
        assert!(matches!(
            envelope.check_freshness(issued - Duration::seconds(1), &options),
            Err(MagicLinkError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_freshness_max_age_shorter_than_lifetime() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let envelope = envelope(issued);
        let options = VerifyOptions::default().with_max_age(Duration::minutes(1));

        assert!(envelope.check_freshness(issued + Duration::seconds(60), &options).is_ok());
        assert!(matches!(
            envelope.check_freshness(issued + Duration::seconds(61), &options),
            Err(MagicLinkError::TokenExpired)
        ));
    }

    #[test]
    fn test_freshness_leeway() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let envelope = envelope(issued);
        let options = VerifyOptions::default().with_leeway(Duration::seconds(30));

        assert!(
            envelope
                .check_freshness(issued + Duration::seconds(330), &options)
                .is_ok()
        );
        assert!(
            envelope
                .check_freshness(issued - Duration::seconds(30), &options)
                .is_ok()
        );
        assert!(
            envelope
                .check_freshness(issued + Duration::seconds(331), &options)
                .is_err()
        );
    }

    #[test]
    fn test_into_verified() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let verified = envelope(issued).into_verified().unwrap();

        assert_eq!(verified.token_id, TokenId::new("tok-1"));
        assert_eq!(verified.issued_at, issued);
        assert_eq!(verified.expires_at, issued + Duration::minutes(5));
        assert_eq!(verified.email(), "a@b.com");
    }
}
