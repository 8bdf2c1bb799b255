//! Error types for the Pressroom server.
//!
//! The request pipeline surfaces exactly three error kinds to callers:
//!
//! - [`ApiError::Unauthorized`] - missing/invalid credential or insufficient
//!   role (HTTP 401, message distinguishes the cause)
//! - [`ApiError::NotFound`] - the target article does not exist (HTTP 404)
//! - [`ApiError::Internal`] - any unanticipated collaborator failure
//!   (HTTP 500, generic message, internals never leak to the caller)
//!
//! Errors are ordinary values propagated with `?`; the [`IntoResponse`]
//! impl is the single point where they are mapped to HTTP.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Failure outcome of a pipeline operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication or authorization failure.
    ///
    /// Covers the whole 401 space: no token, invalid or expired token, and
    /// a valid token whose user lacks the required role. The message tells
    /// the caller which it was.
    #[error("{0}")]
    Unauthorized(String),

    /// The requested article does not exist.
    #[error("article not found")]
    NotFound,

    /// An unanticipated lower-layer failure.
    ///
    /// The carried message is logged server-side; callers only ever see a
    /// generic body.
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Creates an unauthorized error with the given caller-facing message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if this error indicates a client-side problem.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::NotFound)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// JSON error response body.
///
/// Every error response carries at minimum a `message` field.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(detail) => {
                error!(detail = %detail, "Internal error while handling request");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (self.status_code(), Json(ErrorBody { message })).into_response()
    }
}

/// A specialized Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ApiError>;
