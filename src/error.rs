//! Error types for the URL service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Url Error Enum ==
/// Unified error type for URL building and the HTTP layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// A parameter that must hold a number held something else
    #[error("Invalid number for parameter '{key}': '{value}'")]
    InvalidNumber { key: String, value: String },

    /// A parameter required by the page kind was absent or empty
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// The backing name store failed to answer a range fetch
    #[error("Name source error: {0}")]
    Source(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for UrlError {
    fn into_response(self) -> Response {
        let status = match &self {
            UrlError::InvalidNumber { .. }
            | UrlError::MissingParameter(_)
            | UrlError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            UrlError::Source(_) => StatusCode::BAD_GATEWAY,
            UrlError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the URL service.
pub type Result<T> = std::result::Result<T, UrlError>;
