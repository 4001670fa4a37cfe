use sesame_core::{CryptoError, Error as CoreError, ValidationError};
use thiserror::Error;

/// Boxed error returned by delivery and resolver implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum MagicLinkError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ValidationError),

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Delivery failed: {0}")]
    Delivery(#[source] BoxError),

    #[error("Resolution failed: {0}")]
    Resolution(#[source] BoxError),
}

impl From<CryptoError> for MagicLinkError {
    fn from(err: CryptoError) -> Self {
        MagicLinkError::Configuration(ValidationError::InvalidField(err.to_string()))
    }
}

impl From<CoreError> for MagicLinkError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(err) => err.into(),
            CoreError::Crypto(err) => err.into(),
        }
    }
}

impl MagicLinkError {
    /// True for errors caused by the presented token itself (invalid or expired)
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            MagicLinkError::TokenInvalid(_) | MagicLinkError::TokenExpired
        )
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, MagicLinkError::TokenExpired)
    }

    /// Stable name of the error category, for structured logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            MagicLinkError::Configuration(_) => "configuration",
            MagicLinkError::TokenInvalid(_) => "token_invalid",
            MagicLinkError::TokenExpired => "token_expired",
            MagicLinkError::Signing(_) => "signing",
            MagicLinkError::Delivery(_) => "delivery",
            MagicLinkError::Resolution(_) => "resolution",
        }
    }
}
