//! Resolution of verified claims into an application identity
//!
//! After a token passes signature and freshness checks, the strategy asks a
//! [`Resolver`] who the claims belong to. The resolver answers exactly once,
//! with one of three shapes:
//!
//! - `Err(_)`: the lookup failed (database down, ...);
//! - `Ok(Resolution::Rejected { .. })`: the claims are valid but match no identity;
//! - `Ok(Resolution::Authenticated { .. })`: the claims belong to `identity`.

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::{error::BoxError, token::VerifiedClaims};

/// Answer of a [`Resolver`] for valid claims
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<I> {
    Rejected {
        info: Option<Value>,
    },
    Authenticated {
        identity: I,
        info: Option<Value>,
    },
}

impl<I> Resolution<I> {
    pub fn authenticated(identity: I) -> Self {
        Resolution::Authenticated {
            identity,
            info: None,
        }
    }

    pub fn rejected() -> Self {
        Resolution::Rejected { info: None }
    }

    /// Attach an informational payload, replacing any previous one
    pub fn with_info(self, info: impl Into<Value>) -> Self {
        let info = Some(info.into());
        match self {
            Resolution::Rejected { .. } => Resolution::Rejected { info },
            Resolution::Authenticated { identity, .. } => {
                Resolution::Authenticated { identity, info }
            }
        }
    }
}

#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// The identity produced for authenticated claims
    type Identity: Send + 'static;

    async fn resolve(
        &self,
        claims: &VerifiedClaims,
    ) -> Result<Resolution<Self::Identity>, BoxError>;
}

/// Resolver backed by an async closure, see [`resolver_fn`]
pub struct FnResolver<F> {
    f: F,
}

/// Use an async closure as a [`Resolver`]
///
/// ```rust
/// use sesame_magic_link::{BoxError, Resolution, resolver_fn};
///
/// let resolver = resolver_fn(|claims| async move {
///     let resolution = if claims.email() == "a@b.com" {
///         Resolution::authenticated("user_1".to_string())
///     } else {
///         Resolution::rejected()
///     };
///     Ok::<_, BoxError>(resolution)
/// });
/// ```
pub fn resolver_fn<F, Fut, I>(f: F) -> FnResolver<F>
where
    F: Fn(VerifiedClaims) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resolution<I>, BoxError>> + Send + 'static,
    I: Send + 'static,
{
    FnResolver { f }
}

#[async_trait]
impl<F, Fut, I> Resolver for FnResolver<F>
where
    F: Fn(VerifiedClaims) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resolution<I>, BoxError>> + Send + 'static,
    I: Send + 'static,
{
    type Identity = I;

    async fn resolve(&self, claims: &VerifiedClaims) -> Result<Resolution<I>, BoxError> {
        (self.f)(claims.clone()).await
    }
}
