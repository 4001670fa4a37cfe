//! # Sesame Axum Integration
//!
//! This crate provides Axum routes for the sesame magic link strategy. It offers a
//! simple way to add passwordless sign-in to your Axum application.
//!
//! ## Routes
//!
//! | Method | Path                         | Description                                   |
//! | ------ | ---------------------------- | --------------------------------------------- |
//! | POST   | `/magic-link`                | Issue a link for the JSON claims in the body  |
//! | GET    | `/magic-link/verify/{token}` | Verify the token carried by a followed link   |
//! | POST   | `/magic-link/verify`         | Verify `{ "token": ... }`                     |
//! | GET    | `/health`                    | Health check                                  |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use sesame_magic_link::{
//!     BoxError, MagicLinkConfig, MagicLinkStrategy, Resolution, TracingDelivery, resolver_fn,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = MagicLinkConfig::from_env().unwrap();
//!     let resolver = resolver_fn(|claims| async move {
//!         Ok::<_, BoxError>(Resolution::authenticated(claims.email().to_string()))
//!     });
//!     let strategy = Arc::new(MagicLinkStrategy::new(config, TracingDelivery, resolver));
//!
//!     // Create your application router
//!     let app = Router::new().nest("/auth", sesame_axum::routes(strategy).build());
//!
//!     // Run your server
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

mod error;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use routes::{MagicLinkState, create_router};
pub use types::{
    AuthenticatedResponse, HealthResponse, MagicLinkResponse, RejectedResponse,
    VerifyMagicTokenRequest,
};

use axum::Router;
use serde::Serialize;
use sesame_magic_link::{Delivery, MagicLinkStrategy, Resolver};
use std::sync::Arc;

/// Create magic link routes for your Axum application.
///
/// The returned builder produces a router that can be nested into your
/// application at any path (e.g., "/auth"). Remember that the verify link
/// configured on the strategy must point at the nested
/// `/magic-link/verify` route.
pub fn routes<D, R>(strategy: Arc<MagicLinkStrategy<D, R>>) -> MagicLinkRouterBuilder<D, R>
where
    D: Delivery,
    R: Resolver,
    R::Identity: Serialize,
{
    MagicLinkRouterBuilder {
        strategy,
        health_check: true,
    }
}

/// Builder for configuring magic link routes
pub struct MagicLinkRouterBuilder<D: Delivery, R: Resolver> {
    strategy: Arc<MagicLinkStrategy<D, R>>,
    health_check: bool,
}

impl<D, R> MagicLinkRouterBuilder<D, R>
where
    D: Delivery,
    R: Resolver,
    R::Identity: Serialize,
{
    /// Leave out the `/health` route, e.g. when the application serves its own
    pub fn without_health_check(mut self) -> Self {
        self.health_check = false;
        self
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        create_router(self.strategy, self.health_check)
    }
}

impl<D, R> From<MagicLinkRouterBuilder<D, R>> for Router
where
    D: Delivery,
    R: Resolver,
    R::Identity: Serialize,
{
    fn from(builder: MagicLinkRouterBuilder<D, R>) -> Self {
        builder.build()
    }
}
