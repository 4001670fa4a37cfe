use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sesame_magic_link::MagicLinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid or expired magic link")]
    InvalidToken,

    #[error("Unable to deliver the magic link")]
    DeliveryFailed,

    #[error("Internal server error")]
    InternalError,
}

impl From<MagicLinkError> for ApiError {
    fn from(err: MagicLinkError) -> Self {
        match err {
            MagicLinkError::Configuration(err) => ApiError::BadRequest(err.to_string()),
            MagicLinkError::TokenInvalid(_) | MagicLinkError::TokenExpired => {
                tracing::debug!(error = %err, "Rejecting magic link token");
                ApiError::InvalidToken
            }
            MagicLinkError::Delivery(_) => {
                tracing::error!(error = %err, "Magic link delivery failed");
                ApiError::DeliveryFailed
            }
            MagicLinkError::Signing(_) | MagicLinkError::Resolution(_) => {
                tracing::error!(error = %err, kind = err.kind(), "Magic link request failed");
                ApiError::InternalError
            }
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::DeliveryFailed => StatusCode::BAD_GATEWAY,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
