//! Magic link authentication strategy for sesame
//!
//! This strategy lets users sign in by clicking a signed, short-lived link sent to
//! their email address instead of typing a password.
//!
//! # Features
//!
//! - Issue signed links bound to a claims payload and a fresh token id
//! - Verify links against the configured algorithms, expiry and maximum age
//! - Pluggable [`Delivery`] of links and [`Resolver`] of claims into identities
//! - Stateless: nothing is stored between issuing and verifying a link
//!
//! # Example
//!
//! ```rust,no_run
//! use sesame_core::{Claims, SigningKey};
//! use sesame_magic_link::{
//!     BoxError, MagicLinkConfig, MagicLinkStrategy, Outcome, Resolution, TracingDelivery,
//!     resolver_fn,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MagicLinkConfig::builder(SigningKey::hmac("s3cr3t"), "https://example.com/verify")
//!     .build()?;
//!
//! let resolver = resolver_fn(|claims| async move {
//!     Ok::<_, BoxError>(Resolution::authenticated(claims.email().to_string()))
//! });
//!
//! let strategy = MagicLinkStrategy::new(config, TracingDelivery, resolver);
//!
//! // Send a link to the user
//! let issued = strategy.issue(Claims::new("user@example.com")).await?;
//!
//! // Verify the token when the user follows the link
//! let token = issued.link.rsplit('/').next().unwrap_or_default();
//! match strategy.verify(token).await {
//!     Outcome::Authenticated { identity, .. } => println!("Signed in as {identity}"),
//!     Outcome::Rejected { .. } => println!("Unknown user"),
//!     Outcome::Error(err) => println!("Invalid link: {err}"),
//! }
//! # Ok(())
//! # }
//! ```
use std::{future::Future, sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use sesame_core::{
    Claims, Strategy, TokenId,
    validation::{require_email, validate_email},
};

pub mod config;
pub mod delivery;
pub mod error;
pub mod outcome;
pub mod resolver;
pub mod token;

pub use config::{DEFAULT_STRATEGY_NAME, MagicLinkConfig, MagicLinkConfigBuilder};
pub use delivery::{Delivery, FnDelivery, TracingDelivery, delivery_fn};
pub use error::{BoxError, MagicLinkError};
pub use outcome::Outcome;
pub use resolver::{FnResolver, Resolution, Resolver, resolver_fn};
pub use token::{RESERVED_CLAIMS, VerifiedClaims};

use token::TokenEnvelope;

/// A link handed to the delivery callback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuedLink {
    pub token_id: TokenId,
    pub expires_at: DateTime<Utc>,
    pub link: String,
}

/// Magic link authentication strategy
///
/// The strategy is stateless once built and is meant to be shared behind an
/// [`Arc`] by every request handler.
pub struct MagicLinkStrategy<D, R>
where
    D: Delivery,
    R: Resolver,
{
    config: Arc<MagicLinkConfig>,
    delivery: Arc<D>,
    resolver: Arc<R>,
}

impl<D, R> Strategy for MagicLinkStrategy<D, R>
where
    D: Delivery,
    R: Resolver,
{
    fn name(&self) -> String {
        self.config.name().to_string()
    }
}

impl<D, R> MagicLinkStrategy<D, R>
where
    D: Delivery,
    R: Resolver,
{
    pub fn new(config: MagicLinkConfig, delivery: D, resolver: R) -> Self {
        Self {
            config: Arc::new(config),
            delivery: Arc::new(delivery),
            resolver: Arc::new(resolver),
        }
    }

    pub fn config(&self) -> &MagicLinkConfig {
        &self.config
    }

    /// Issue a link for `claims` and hand it to the delivery callback
    ///
    /// The email claim must be present. Claims named like the token envelope
    /// fields (see [`RESERVED_CLAIMS`]) are dropped from the payload.
    pub async fn issue(&self, mut claims: Claims) -> Result<IssuedLink, MagicLinkError> {
        let strategy = self.config.name();

        if self.config.require_valid_email() {
            validate_email(&claims.email)?;
        } else {
            require_email(&claims.email)?;
        }

        let dropped = claims.strip_reserved(RESERVED_CLAIMS);
        if !dropped.is_empty() {
            tracing::debug!(strategy, dropped = ?dropped, "Dropped reserved claims from payload");
        }

        let token_id = self.config.token_id_space().generate();
        let issued_at = self.config.clock().now().trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(self.config.sign_options().expires_in)
            .ok_or_else(|| MagicLinkError::Signing("expiry is out of range".to_string()))?;

        let token = TokenEnvelope::new(claims.clone(), token_id.clone(), issued_at, expires_at)
            .sign(self.config.sign_options().algorithm, self.config.key())?;
        let link = self.config.link_for(&token);

        let delivered = with_timeout(
            self.config.delivery_timeout(),
            self.delivery.deliver(&claims, &link, &token_id),
        )
        .await;

        if let Err(err) = delivered {
            tracing::error!(
                strategy,
                token_id = %token_id,
                error.kind = "delivery",
                error = %err,
                "Magic link delivery failed"
            );
            return Err(MagicLinkError::Delivery(err));
        }

        tracing::info!(
            strategy,
            token_id = %token_id,
            expires_at = %expires_at,
            "Magic link issued"
        );

        Ok(IssuedLink {
            token_id,
            expires_at,
            link,
        })
    }

    /// Check a token's signature and freshness without resolving its claims
    pub fn verify_claims(&self, token: &str) -> Result<VerifiedClaims, MagicLinkError> {
        let options = self.config.verify_options();
        let envelope = TokenEnvelope::decode(token, self.config.key(), options)?;
        envelope.check_freshness(self.config.clock().now(), options)?;
        envelope.into_verified()
    }

    /// Verify a token and resolve its claims into an identity
    pub async fn verify(&self, token: &str) -> Outcome<R::Identity> {
        let strategy = self.config.name();

        let claims = match self.verify_claims(token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!(
                    strategy,
                    error.kind = err.kind(),
                    error = %err,
                    "Magic link verification failed"
                );
                return Outcome::Error(err);
            }
        };

        let resolved = with_timeout(
            self.config.resolution_timeout(),
            self.resolver.resolve(&claims),
        )
        .await;

        match resolved {
            Ok(Resolution::Authenticated { identity, info }) => {
                tracing::info!(strategy, token_id = %claims.token_id, "Magic link authenticated");
                Outcome::Authenticated { identity, info }
            }
            Ok(Resolution::Rejected { info }) => {
                tracing::warn!(strategy, token_id = %claims.token_id, "Magic link claims rejected");
                Outcome::Rejected { info }
            }
            Err(err) => {
                tracing::error!(
                    strategy,
                    token_id = %claims.token_id,
                    error.kind = "resolution",
                    error = %err,
                    "Magic link resolution failed"
                );
                Outcome::Error(MagicLinkError::Resolution(err))
            }
        }
    }
}

async fn with_timeout<T>(
    limit: Option<StdDuration>,
    future: impl Future<Output = Result<T, BoxError>>,
) -> Result<T, BoxError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| BoxError::from(format!("timed out after {limit:?}")))?,
        None => future.await,
    }
}
