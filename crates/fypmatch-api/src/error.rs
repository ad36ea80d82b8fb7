//! HTTP error responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use fypmatch_core::FieldError;

#[derive(Debug)]
pub enum ApiError {
    /// Request body failed validation.
    Validation(Vec<FieldError>),
    NotFound(String),
    /// A backing service failed. The message is returned to the client and
    /// must not carry internal details.
    Internal(String),
}

impl ApiError {
    /// Log `err` and return a 500 with the public `message` only.
    pub fn internal(message: &str, err: impl std::fmt::Display) -> Self {
        error!(subsystem = "api", error = %err, "{}", message);
        ApiError::Internal(message.to_string())
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![FieldError {
            field: "body".to_string(),
            message: rejection.body_text(),
        }])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "success": false,
                    "errors": errors,
                })),
            )
                .into_response(),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
        }
    }
}
