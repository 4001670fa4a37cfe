use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Algorithm {algorithm} cannot be used with a {family} key")]
    AlgorithmMismatch { algorithm: String, family: String },

    #[error("No verification algorithms allowed")]
    EmptyAllowList,
}

impl Error {
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Error::Crypto(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let validation_error =
            Error::Validation(ValidationError::InvalidEmail("test@".to_string()));
        assert_eq!(
            validation_error.to_string(),
            "Validation error: Invalid email format: test@"
        );

        let crypto_error = Error::Crypto(CryptoError::EmptyAllowList);
        assert_eq!(
            crypto_error.to_string(),
            "Cryptographic error: No verification algorithms allowed"
        );
    }

    #[test]
    fn test_validation_error_variants() {
        let invalid_email = ValidationError::InvalidEmail("bad@".to_string());
        assert_eq!(invalid_email.to_string(), "Invalid email format: bad@");

        let missing_field = ValidationError::MissingField("email".to_string());
        assert_eq!(missing_field.to_string(), "Missing required field: email");

        let invalid_field = ValidationError::InvalidField("verify_link".to_string());
        assert_eq!(invalid_field.to_string(), "Invalid field: verify_link");
    }

    #[test]
    fn test_crypto_error_variants() {
        let mismatch = CryptoError::AlgorithmMismatch {
            algorithm: "RS256".to_string(),
            family: "HMAC".to_string(),
        };
        assert_eq!(
            mismatch.to_string(),
            "Algorithm RS256 cannot be used with a HMAC key"
        );

        let invalid = CryptoError::InvalidKey("not a PEM".to_string());
        assert_eq!(invalid.to_string(), "Invalid signing key: not a PEM");
    }

    #[test]
    fn test_error_predicates() {
        let missing = Error::Validation(ValidationError::MissingField("email".into()));
        assert!(missing.is_validation_error());
        assert!(!missing.is_crypto_error());
        assert!(Error::Crypto(CryptoError::EmptyAllowList).is_crypto_error());
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = ValidationError::MissingField("email".to_string()).into();
        assert!(matches!(
            error,
            Error::Validation(ValidationError::MissingField(_))
        ));

        let error: Error = CryptoError::EmptyAllowList.into();
        assert!(matches!(error, Error::Crypto(CryptoError::EmptyAllowList)));
    }
}
