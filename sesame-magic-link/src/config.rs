//! Magic link strategy configuration
//!
//! The configuration is assembled once through [`MagicLinkConfigBuilder`],
//! validated by [`MagicLinkConfigBuilder::build`], and is read-only afterwards.
//!
//! ```rust
//! use chrono::Duration;
//! use sesame_core::SigningKey;
//! use sesame_magic_link::MagicLinkConfig;
//!
//! let config = MagicLinkConfig::builder(SigningKey::hmac("s3cr3t"), "https://example.com/verify")
//!     .with_expires_in(Duration::minutes(10))
//!     .with_max_age(Duration::minutes(10))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.name(), "magic_link");
//! ```

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::Duration;
use sesame_core::{
    Algorithm, Clock, CompiledKey, CryptoError, KeyFamily, SignOptions, SigningKey, SystemClock,
    TokenIdSpace, ValidationError, VerifyOptions, validation::validate_verify_link,
};

use crate::error::MagicLinkError;

/// Default strategy name
pub const DEFAULT_STRATEGY_NAME: &str = "magic_link";

const MIN_HMAC_SECRET_LEN: usize = 32;

/// Validated, immutable configuration of a magic link strategy
#[derive(Debug, Clone)]
pub struct MagicLinkConfig {
    name: String,
    verify_link: String,
    key: CompiledKey,
    sign_options: SignOptions,
    verify_options: VerifyOptions,
    token_id_space: TokenIdSpace,
    require_valid_email: bool,
    delivery_timeout: Option<StdDuration>,
    resolution_timeout: Option<StdDuration>,
    clock: Arc<dyn Clock>,
}

impl MagicLinkConfig {
    /// Start building a configuration for the given key and base verification link
    pub fn builder(key: SigningKey, verify_link: impl Into<String>) -> MagicLinkConfigBuilder {
        MagicLinkConfigBuilder::new(key, verify_link)
    }

    /// Build a configuration from environment variables
    ///
    /// | Variable                     | Required | Description                              |
    /// | ---------------------------- | -------- | ---------------------------------------- |
    /// | `MAGIC_LINK_SECRET`          | yes [^1] | HMAC secret used to sign tokens          |
    /// | `MAGIC_LINK_RSA_PRIVATE_KEY` | no       | Path to a PEM private key (RS256)        |
    /// | `MAGIC_LINK_RSA_PUBLIC_KEY`  | no       | Path to the matching PEM public key      |
    /// | `MAGIC_LINK_VERIFY_URL`      | yes      | Base link the token is appended to       |
    /// | `MAGIC_LINK_EXPIRES_IN_SECS` | no       | Token lifetime (default 300)             |
    /// | `MAGIC_LINK_MAX_AGE_SECS`    | no       | Maximum accepted age (default 300)       |
    /// | `MAGIC_LINK_LEEWAY_SECS`     | no       | Clock skew tolerance (default 0)         |
    /// | `MAGIC_LINK_STRATEGY_NAME`   | no       | Strategy name (default `magic_link`)     |
    ///
    /// [^1]: not required when both RSA key paths are set.
    pub fn from_env() -> Result<Self, MagicLinkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MagicLinkError> {
        let key = match (
            lookup("MAGIC_LINK_RSA_PRIVATE_KEY"),
            lookup("MAGIC_LINK_RSA_PUBLIC_KEY"),
        ) {
            (Some(private_key), Some(public_key)) => {
                SigningKey::from_rsa_pem_files(private_key, public_key)?
            }
            _ => lookup("MAGIC_LINK_SECRET")
                .map(SigningKey::hmac)
                .ok_or_else(|| ValidationError::MissingField("MAGIC_LINK_SECRET".to_string()))?,
        };
        let verify_link = lookup("MAGIC_LINK_VERIFY_URL")
            .ok_or_else(|| ValidationError::MissingField("MAGIC_LINK_VERIFY_URL".to_string()))?;

        let seconds = |name: &str| -> Result<Option<Duration>, MagicLinkError> {
            let Some(value) = lookup(name) else {
                return Ok(None);
            };

            let secs = value
                .trim()
                .parse::<i64>()
                .map_err(|e| ValidationError::InvalidField(format!("{name}: {e}")))?;

            Duration::try_seconds(secs)
                .map(Some)
                .ok_or_else(|| ValidationError::InvalidField(format!("{name}: out of range")).into())
        };

        let mut builder = Self::builder(key, verify_link);

        if let Some(expires_in) = seconds("MAGIC_LINK_EXPIRES_IN_SECS")? {
            builder = builder.with_expires_in(expires_in);
        }
        if let Some(max_age) = seconds("MAGIC_LINK_MAX_AGE_SECS")? {
            builder = builder.with_max_age(max_age);
        }
        if let Some(leeway) = seconds("MAGIC_LINK_LEEWAY_SECS")? {
            builder = builder.with_leeway(leeway);
        }
        if let Some(name) = lookup("MAGIC_LINK_STRATEGY_NAME") {
            builder = builder.with_name(name);
        }

        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn verify_link(&self) -> &str {
        &self.verify_link
    }

    pub fn key(&self) -> &CompiledKey {
        &self.key
    }

    pub fn sign_options(&self) -> &SignOptions {
        &self.sign_options
    }

    pub fn verify_options(&self) -> &VerifyOptions {
        &self.verify_options
    }

    pub fn token_id_space(&self) -> TokenIdSpace {
        self.token_id_space
    }

    pub fn require_valid_email(&self) -> bool {
        self.require_valid_email
    }

    pub fn delivery_timeout(&self) -> Option<StdDuration> {
        self.delivery_timeout
    }

    pub fn resolution_timeout(&self) -> Option<StdDuration> {
        self.resolution_timeout
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Build the link delivered to the user: `{verify_link}/{token}`
    pub fn link_for(&self, token: &str) -> String {
        format!("{}/{}", self.verify_link.trim_end_matches('/'), token)
    }
}

/// Builder for [`MagicLinkConfig`]
#[derive(Debug)]
pub struct MagicLinkConfigBuilder {
    name: String,
    verify_link: String,
    key: SigningKey,
    sign_options: SignOptions,
    verify_options: VerifyOptions,
    token_id_space: TokenIdSpace,
    require_valid_email: bool,
    delivery_timeout: Option<StdDuration>,
    resolution_timeout: Option<StdDuration>,
    clock: Arc<dyn Clock>,
}

impl MagicLinkConfigBuilder {
    pub fn new(key: SigningKey, verify_link: impl Into<String>) -> Self {
        // RSA keys cannot use the HS256 defaults
        let algorithm = match key.family() {
            KeyFamily::Rsa => Algorithm::RS256,
            _ => Algorithm::HS256,
        };

        Self {
            name: DEFAULT_STRATEGY_NAME.to_string(),
            verify_link: verify_link.into(),
            key,
            sign_options: SignOptions::default().with_algorithm(algorithm),
            verify_options: VerifyOptions::default().with_algorithms([algorithm]),
            token_id_space: TokenIdSpace::default(),
            require_valid_email: false,
            delivery_timeout: None,
            resolution_timeout: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the strategy name used to select this strategy among others
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sign with `algorithm` and accept only `algorithm` at verification
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.sign_options.algorithm = algorithm;
        self.verify_options.algorithms = vec![algorithm];
        self
    }

    pub fn with_sign_options(mut self, options: SignOptions) -> Self {
        self.sign_options = options;
        self
    }

    pub fn with_verify_options(mut self, options: VerifyOptions) -> Self {
        self.verify_options = options;
        self
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.sign_options.expires_in = expires_in;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.verify_options.max_age = max_age;
        self
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.verify_options.leeway = leeway;
        self
    }

    pub fn with_token_id_space(mut self, space: TokenIdSpace) -> Self {
        self.token_id_space = space;
        self
    }

    /// Reject issuance for emails that do not look like an address
    pub fn with_email_validation(mut self, enabled: bool) -> Self {
        self.require_valid_email = enabled;
        self
    }

    /// Fail issuance with a delivery error when delivery takes longer than `timeout`
    pub fn with_delivery_timeout(mut self, timeout: StdDuration) -> Self {
        self.delivery_timeout = Some(timeout);
        self
    }

    /// Fail verification with a resolution error when resolving takes longer than `timeout`
    pub fn with_resolution_timeout(mut self, timeout: StdDuration) -> Self {
        self.resolution_timeout = Some(timeout);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn build(self) -> Result<MagicLinkConfig, MagicLinkError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }

        validate_verify_link(&self.verify_link)?;

        if let SigningKey::Hmac { secret } = &self.key {
            if secret.len() < MIN_HMAC_SECRET_LEN {
                tracing::warn!(
                    strategy = %self.name,
                    "HMAC secret is shorter than {MIN_HMAC_SECRET_LEN} bytes"
                );
            }
        }

        let key = self.key.compile()?;
        key.check_algorithm(self.sign_options.algorithm)?;

        if self.verify_options.algorithms.is_empty() {
            return Err(CryptoError::EmptyAllowList.into());
        }
        for algorithm in &self.verify_options.algorithms {
            key.check_algorithm(*algorithm)?;
        }

        if self.sign_options.expires_in <= Duration::zero() {
            return Err(ValidationError::InvalidField("expires_in must be positive".into()).into());
        }
        if self.verify_options.max_age <= Duration::zero() {
            return Err(ValidationError::InvalidField("max_age must be positive".into()).into());
        }
        if self.verify_options.leeway < Duration::zero() {
            return Err(ValidationError::InvalidField("leeway cannot be negative".into()).into());
        }

        Ok(MagicLinkConfig {
            name: self.name,
            verify_link: self.verify_link,
            key,
            sign_options: self.sign_options,
            verify_options: self.verify_options,
            token_id_space: self.token_id_space,
            require_valid_email: self.require_valid_email,
            delivery_timeout: self.delivery_timeout,
            resolution_timeout: self.resolution_timeout,
            clock: self.clock,
        })
    }
}
