use crate::dispatch::DispatchError;
use crate::drafts::StoreError;
use crate::gateway::GatewayError;
use crate::ingest::IngestError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::tag::TagError;
use serde_json::json;

/// Error returned by every handler; rendered as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("missing authenticated identity")]
    Unauthenticated,
    #[error("user '{0}' is not authorized")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Ingest(_) | Self::Tag(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Dispatch(e) => match e {
                DispatchError::AlreadyRunning
                | DispatchError::AlreadySent
                | DispatchError::NotConfirming => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Gateway(e) => match e {
                GatewayError::NotConfigured(_)
                | GatewayError::EmptyAllowlist
                | GatewayError::NotAllowed(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Config(_) | Self::Internal(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("request rejected ({}): {}", status.as_u16(), self);
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}
