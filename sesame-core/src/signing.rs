//! Signing keys and token signing/verification options
//!
//! Tokens are signed as JSON Web Tokens. A [`SigningKey`] holds the raw key
//! material; [`SigningKey::compile`] parses it once into the `jsonwebtoken`
//! encoding and decoding keys so that issuing and verifying never re-parse PEM.

use std::{fmt, path::Path};

use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey};

pub use jsonwebtoken::Algorithm;

use crate::error::{CryptoError, Error, ValidationError};

/// Family of an algorithm or key; keys can only be used with algorithms of their own family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    pub fn of(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => KeyFamily::Hmac,
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => KeyFamily::Rsa,
            Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
            Algorithm::EdDSA => KeyFamily::Ed,
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyFamily::Hmac => "HMAC",
            KeyFamily::Rsa => "RSA",
            KeyFamily::Ec => "EC",
            KeyFamily::Ed => "EdDSA",
        };
        f.write_str(name)
    }
}

/// Key material used to sign and verify tokens
#[derive(Clone)]
pub enum SigningKey {
    /// Shared secret for the HS* algorithms
    Hmac {
        /// Secret key for both signing and verifying
        secret: Vec<u8>,
    },
    /// RSA key pair for the RS* and PS* algorithms
    Rsa {
        /// Private key for signing (PEM format)
        private_key: Vec<u8>,
        /// Public key for verifying (PEM format)
        public_key: Vec<u8>,
    },
}

impl SigningKey {
    pub fn hmac(secret: impl Into<Vec<u8>>) -> Self {
        SigningKey::Hmac {
            secret: secret.into(),
        }
    }

    pub fn rsa_pem(private_key: impl Into<Vec<u8>>, public_key: impl Into<Vec<u8>>) -> Self {
        SigningKey::Rsa {
            private_key: private_key.into(),
            public_key: public_key.into(),
        }
    }

    /// Load an RSA key pair from PEM files
    pub fn from_rsa_pem_files(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        use std::fs::read;

        let private_key = read(private_key_path).map_err(|e| {
            ValidationError::InvalidField(format!("Failed to read private key file: {e}"))
        })?;

        let public_key = read(public_key_path).map_err(|e| {
            ValidationError::InvalidField(format!("Failed to read public key file: {e}"))
        })?;

        Ok(Self::rsa_pem(private_key, public_key))
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            SigningKey::Hmac { .. } => KeyFamily::Hmac,
            SigningKey::Rsa { .. } => KeyFamily::Rsa,
        }
    }

    /// Parse the key material into reusable encoding/decoding keys
    pub fn compile(&self) -> Result<CompiledKey, CryptoError> {
        let (encoding, decoding) = match self {
            SigningKey::Hmac { secret } => {
                if secret.is_empty() {
                    return Err(CryptoError::InvalidKey("HMAC secret is empty".to_string()));
                }
                (
                    EncodingKey::from_secret(secret),
                    DecodingKey::from_secret(secret),
                )
            }
            SigningKey::Rsa {
                private_key,
                public_key,
            } => {
                let encoding = EncodingKey::from_rsa_pem(private_key)
                    .map_err(|e| CryptoError::InvalidKey(format!("Invalid RSA private key: {e}")))?;
                let decoding = DecodingKey::from_rsa_pem(public_key)
                    .map_err(|e| CryptoError::InvalidKey(format!("Invalid RSA public key: {e}")))?;
                (encoding, decoding)
            }
        };

        Ok(CompiledKey {
            family: self.family(),
            encoding,
            decoding,
        })
    }
}

// Never print key material.
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKey::Hmac { .. } => f.debug_struct("Hmac").finish_non_exhaustive(),
            SigningKey::Rsa { .. } => f.debug_struct("Rsa").finish_non_exhaustive(),
        }
    }
}

/// Parsed signing key, ready for use with `jsonwebtoken`
#[derive(Clone)]
pub struct CompiledKey {
    family: KeyFamily,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl CompiledKey {
    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Check that this key can be used with the given algorithm
    pub fn check_algorithm(&self, algorithm: Algorithm) -> Result<(), CryptoError> {
        if KeyFamily::of(algorithm) == self.family {
            Ok(())
        } else {
            Err(CryptoError::AlgorithmMismatch {
                algorithm: format!("{algorithm:?}"),
                family: self.family.to_string(),
            })
        }
    }
}

impl fmt::Debug for CompiledKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledKey")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

/// Options applied when signing a token
#[derive(Debug, Clone)]
pub struct SignOptions {
    /// Signature algorithm (default: HS256)
    pub algorithm: Algorithm,
    /// Lifetime of the token (default: 5 minutes)
    pub expires_in: Duration,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::HS256,
            expires_in: Duration::minutes(5),
        }
    }
}

impl SignOptions {
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }
}

/// Options applied when verifying a token
///
/// A token is fresh when `now <= exp + leeway` and `now - iat <= max_age + leeway`.
/// `leeway` is the only clock skew tolerance and defaults to zero.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Algorithms accepted in the token header (default: HS256 only)
    pub algorithms: Vec<Algorithm>,
    /// Maximum time since issuance (default: 5 minutes)
    pub max_age: Duration,
    /// Clock skew tolerance (default: none)
    pub leeway: Duration,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            algorithms: vec![Algorithm::HS256],
            max_age: Duration::minutes(5),
            leeway: Duration::zero(),
        }
    }
}

impl VerifyOptions {
    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_HS256_SECRET: &[u8] = b"test_secret_key_for_hs256_jwt_tokens_not_for_production_use";

    #[test]
    fn test_key_family_of() {
        assert_eq!(KeyFamily::of(Algorithm::HS512), KeyFamily::Hmac);
        assert_eq!(KeyFamily::of(Algorithm::PS256), KeyFamily::Rsa);
        assert_eq!(KeyFamily::of(Algorithm::ES256), KeyFamily::Ec);
        assert_eq!(KeyFamily::of(Algorithm::EdDSA), KeyFamily::Ed);
    }

    #[test]
    fn test_compile_hmac() {
        let key = SigningKey::hmac(TEST_HS256_SECRET).compile().unwrap();
        assert_eq!(key.family(), KeyFamily::Hmac);
        assert!(key.check_algorithm(Algorithm::HS256).is_ok());
        assert!(key.check_algorithm(Algorithm::HS384).is_ok());
        assert!(matches!(
            key.check_algorithm(Algorithm::RS256),
            Err(CryptoError::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn test_compile_empty_secret() {
        assert!(matches!(
            SigningKey::hmac(Vec::new()).compile(),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_compile_invalid_rsa_pem() {
        let key = SigningKey::rsa_pem(b"not a pem".to_vec(), b"not a pem".to_vec());
        assert_eq!(key.family(), KeyFamily::Rsa);
        assert!(matches!(key.compile(), Err(CryptoError::InvalidKey(_))));
    }

    #[test]
    fn test_missing_pem_files() {
        let result =
            SigningKey::from_rsa_pem_files("/nonexistent/private.pem", "/nonexistent/public.pem");
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidField(_)))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = SigningKey::hmac("s3cr3t");
        let printed = format!("{key:?}");
        assert!(!printed.contains("s3cr3t"));
        assert_eq!(printed, "Hmac { .. }");
    }

    #[test]
    fn test_option_defaults() {
        let sign = SignOptions::default();
        assert_eq!(sign.algorithm, Algorithm::HS256);
        assert_eq!(sign.expires_in, Duration::minutes(5));

        let verify = VerifyOptions::default();
        assert_eq!(verify.algorithms, vec![Algorithm::HS256]);
        assert_eq!(verify.max_age, Duration::minutes(5));
        assert_eq!(verify.leeway, Duration::zero());
    }

    #[test]
    fn test_option_builders() {
        let sign = SignOptions::default()
            .with_algorithm(Algorithm::HS512)
            .with_expires_in(Duration::minutes(15));
        assert_eq!(sign.algorithm, Algorithm::HS512);
        assert_eq!(sign.expires_in, Duration::minutes(15));

        let verify = VerifyOptions::default()
            .with_algorithms([Algorithm::HS256, Algorithm::HS512])
            .with_max_age(Duration::minutes(15))
            .with_leeway(Duration::seconds(30));
        assert_eq!(verify.algorithms.len(), 2);
        assert_eq!(verify.max_age, Duration::minutes(15));
        assert_eq!(verify.leeway, Duration::seconds(30));
    }
}
