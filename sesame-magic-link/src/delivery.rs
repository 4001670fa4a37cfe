//! Delivery of magic links to their recipient
//!
//! The strategy does not know how links reach users. It hands the claims, the
//! link and the token id to a [`Delivery`] implementation and waits for it to
//! finish. A failed delivery is reported to the caller and never retried.

use std::future::Future;

use async_trait::async_trait;
use sesame_core::{Claims, TokenId};

use crate::error::BoxError;

#[async_trait]
pub trait Delivery: Send + Sync + 'static {
    /// Send `link` to the owner of `claims`
    async fn deliver(
        &self,
        claims: &Claims,
        link: &str,
        token_id: &TokenId,
    ) -> Result<(), BoxError>;
}

/// Delivery backed by an async closure, see [`delivery_fn`]
pub struct FnDelivery<F> {
    f: F,
}

/// Use an async closure as a [`Delivery`]
///
/// ```rust
/// use sesame_magic_link::{BoxError, delivery_fn};
///
/// let delivery = delivery_fn(|claims, link, _token_id| async move {
///     println!("Sending {link} to {}", claims.email);
///     Ok::<_, BoxError>(())
/// });
/// ```
pub fn delivery_fn<F, Fut>(f: F) -> FnDelivery<F>
where
    F: Fn(Claims, String, TokenId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    FnDelivery { f }
}

#[async_trait]
impl<F, Fut> Delivery for FnDelivery<F>
where
    F: Fn(Claims, String, TokenId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn deliver(
        &self,
        claims: &Claims,
        link: &str,
        token_id: &TokenId,
    ) -> Result<(), BoxError> {
        (self.f)(claims.clone(), link.to_string(), token_id.clone()).await
    }
}

/// Development delivery that writes the link to the log instead of sending it
///
/// Never use this in production: anyone with access to the logs can sign in
/// as any user.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDelivery;

#[async_trait]
impl Delivery for TracingDelivery {
    async fn deliver(
        &self,
        claims: &Claims,
        link: &str,
        token_id: &TokenId,
    ) -> Result<(), BoxError> {
        tracing::info!(
            email = %claims.email,
            token_id = %token_id,
            link = %link,
            "Magic link ready for delivery"
        );
        Ok(())
    }
}
