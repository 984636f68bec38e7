//! Custom error types for the API service

use auth::{AuthError, ValidationErrors};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::FilterError;
use serde_json::json;
use thiserror::Error;

use crate::repositories::StoreError;
use crate::support::TicketError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Form input failing validation, per field
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An upstream service could not be reached or misbehaved
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Listing query that the filter model refused
    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::EmailTaken(_) => ApiError::Conflict(err.to_string()),
            AuthError::Unavailable(_) | AuthError::InvalidToken(_) => {
                ApiError::BadGateway(err.to_string())
            }
            AuthError::Cancelled | AuthError::Internal(_) => {
                tracing::error!("Authentication failed: {}", err);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::Unavailable(_) => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Unavailable(_) => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Validation(fields) => {
                let body = Json(json!({
                    "error": "Validation failed",
                    "fields": fields,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Filter(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
