//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding. The full checkout taxonomy is logged here once;
//! clients only ever see two generic checkout messages (insufficient balance
//! is distinguished, everything else collapses to one retry message) plus
//! explicit precondition details.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::supabase::StoreError;

/// Application-level error type for the webapp.
#[derive(Debug, Error)]
pub enum AppError {
    /// Persistence gateway operation failed outside checkout.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Checkout failed; see the inner taxonomy.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if server_error(&self) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Store(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(err) => match err {
                CheckoutError::Precondition(_) => StatusCode::BAD_REQUEST,
                CheckoutError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::UserNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
                CheckoutError::OrderCreate(_)
                | CheckoutError::OrderItems { .. }
                | CheckoutError::Network(_) => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) => "External service error".to_string(),
            Self::Checkout(err) => match err {
                CheckoutError::Precondition(failure) => {
                    format!("Cannot check out: {failure}.")
                }
                CheckoutError::InsufficientBalance { .. } => {
                    "Insufficient loyalty balance.".to_string()
                }
                CheckoutError::UserNotFound(_)
                | CheckoutError::OrderCreate(_)
                | CheckoutError::OrderItems { .. }
                | CheckoutError::Network(_) => {
                    "Could not process the order, try again.".to_string()
                }
            },
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Whether this error should be captured to Sentry.
const fn server_error(error: &AppError) -> bool {
    match error {
        AppError::Store(_) | AppError::Internal(_) => true,
        AppError::Checkout(err) => !matches!(
            err,
            CheckoutError::Precondition(_) | CheckoutError::InsufficientBalance { .. }
        ),
        AppError::NotFound(_) | AppError::BadRequest(_) => false,
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use lavka_core::TelegramId;

    use super::*;
    use crate::checkout::PreconditionFailure;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_checkout_taxonomy_collapses() {
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::Precondition(
                PreconditionFailure::EmptyCart
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::InsufficientBalance {
                requested: 50,
                balance: 10
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::UserNotFound(
                TelegramId::new(1)
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
