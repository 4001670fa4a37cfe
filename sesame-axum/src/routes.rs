use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use sesame_core::{Claims, Strategy};
use sesame_magic_link::{Delivery, MagicLinkError, MagicLinkStrategy, Outcome, Resolver};

use crate::{
    error::{ApiError, Result},
    types::*,
};

pub struct MagicLinkState<D: Delivery, R: Resolver> {
    pub strategy: Arc<MagicLinkStrategy<D, R>>,
}

impl<D: Delivery, R: Resolver> Clone for MagicLinkState<D, R> {
    fn clone(&self) -> Self {
        Self {
            strategy: self.strategy.clone(),
        }
    }
}

pub fn create_router<D, R>(strategy: Arc<MagicLinkStrategy<D, R>>, health_check: bool) -> Router
where
    D: Delivery,
    R: Resolver,
    R::Identity: Serialize,
{
    let state = MagicLinkState { strategy };

    let mut router = Router::new()
        .route("/magic-link", post(request_magic_link_handler::<D, R>))
        .route("/magic-link/verify", post(verify_magic_link_handler::<D, R>))
        .route(
            "/magic-link/verify/{token}",
            get(follow_magic_link_handler::<D, R>),
        );

    if health_check {
        router = router.route("/health", get(health_handler::<D, R>));
    }

    router.with_state(state)
}

async fn health_handler<D, R>(State(state): State<MagicLinkState<D, R>>) -> impl IntoResponse
where
    D: Delivery,
    R: Resolver,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        strategy: state.strategy.name(),
    })
}

async fn request_magic_link_handler<D, R>(
    State(state): State<MagicLinkState<D, R>>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse>
where
    D: Delivery,
    R: Resolver,
{
    let claims = Claims::try_from(payload).map_err(MagicLinkError::from)?;

    let issued = state.strategy.issue(claims).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MagicLinkResponse {
            message: "Magic link sent to your email".to_string(),
            token_id: issued.token_id,
            expires_at: issued.expires_at,
        }),
    ))
}

async fn verify_magic_link_handler<D, R>(
    State(state): State<MagicLinkState<D, R>>,
    Json(payload): Json<VerifyMagicTokenRequest>,
) -> Result<Response>
where
    D: Delivery,
    R: Resolver,
    R::Identity: Serialize,
{
    verify_token(&state, &payload.token).await
}

async fn follow_magic_link_handler<D, R>(
    State(state): State<MagicLinkState<D, R>>,
    Path(token): Path<String>,
) -> Result<Response>
where
    D: Delivery,
    R: Resolver,
    R::Identity: Serialize,
{
    verify_token(&state, &token).await
}

async fn verify_token<D, R>(state: &MagicLinkState<D, R>, token: &str) -> Result<Response>
where
    D: Delivery,
    R: Resolver,
    R::Identity: Serialize,
{
    match state.strategy.verify(token).await {
        Outcome::Authenticated { identity, info } => {
            Ok(Json(AuthenticatedResponse { identity, info }).into_response())
        }
        Outcome::Rejected { info } => {
            let status = StatusCode::UNAUTHORIZED;
            let body = RejectedResponse {
                error: "Unauthorized".to_string(),
                code: status.as_u16(),
                info,
            };
            Ok((status, Json(body)).into_response())
        }
        Outcome::Error(err) => Err(ApiError::from(err)),
    }
}
