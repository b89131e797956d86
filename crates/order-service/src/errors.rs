//! Order Service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. The
//! response body is the order failure envelope
//! `{"status": "failed", "reason": "<reason>"}`; error details stay in the
//! server-side logs.

use crate::models::{FailureReason, OrderFailure};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Order Service error type.
///
/// Maps to HTTP status codes:
/// - OutOfStock: 409 Conflict
/// - Dependency: 502 Bad Gateway
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Out of stock")]
    OutOfStock,

    #[error("Dependency error: {0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::OutOfStock => 409,
            OrderError::Dependency(_) => 502,
            OrderError::Internal(_) => 500,
        }
    }

    /// Failure reason for metrics and the response body.
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            OrderError::OutOfStock => FailureReason::OutOfStock,
            OrderError::Dependency(_) => FailureReason::DependencyError,
            OrderError::Internal(_) => FailureReason::InternalError,
        }
    }

    /// Machine-readable failure reason returned to clients.
    pub fn reason(&self) -> &'static str {
        self.failure_reason().as_str()
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        match &self {
            OrderError::OutOfStock => {}
            OrderError::Dependency(err) => {
                tracing::warn!(target: "order.dependency", error = %err, "Dependency call failed");
            }
            OrderError::Internal(err) => {
                tracing::error!(target: "order.internal", error = %err, "Order processing failed");
            }
        }

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(OrderFailure::new(self.reason()))).into_response()
    }
}
