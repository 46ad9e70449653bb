//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use shopfront_core::cart::CartError;
use thiserror::Error;

use crate::catalog::{CatalogError, FormError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog service call failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart could not be read from or written to the session.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Admin form failed validation.
    #[error("Invalid form: {0}")]
    Form(#[from] FormError),

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

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Cart(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Catalog(CatalogError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::RateLimited(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Catalog(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Form(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> String {
        match self {
            Self::Cart(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Catalog(CatalogError::NotFound(what)) => format!("Not found: {what}"),
            Self::Catalog(CatalogError::RateLimited(secs)) => {
                format!("Catalog is busy, retry after {secs} seconds")
            }
            Self::Catalog(CatalogError::Status { message, .. })
                if self.status() == StatusCode::BAD_REQUEST =>
            {
                message.clone()
            }
            Self::Catalog(_) => "External service error".to_string(),
            Self::Form(err) => err.to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "65f0")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
