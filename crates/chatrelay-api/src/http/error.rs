//! Application error type mapping to HTTP status codes and `{error, details}` bodies.

use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatrelay_types::error::ChatError;

/// Client-facing text for a malformed POST body.
pub const INVALID_BODY: &str = "Invalid request body";
/// Client-facing text for storage failures.
pub const DATABASE_ERROR: &str = "Database error";
/// Client-facing text for anything unexpected.
pub const GENERIC_ERROR: &str = "Something went wrong!";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Body missing, not JSON, or failing shape checks.
    InvalidBody,
    /// Errors from the conversation service.
    Chat(ChatError),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidBody | AppError::Chat(ChatError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": INVALID_BODY }))).into_response()
            }
            AppError::Chat(ChatError::Storage(e)) => {
                tracing::error!(error = %e, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": DATABASE_ERROR, "details": e.to_string() })),
                )
                    .into_response()
            }
            AppError::Internal(details) => {
                tracing::error!(%details, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": GENERIC_ERROR, "details": details })),
                )
                    .into_response()
            }
        }
    }
}

/// Turn a handler panic into the generic 500 body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(details).into_response()
}
