use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};

use crate::store::StorageError;
use crate::submission::ValidationErrors;

/// Shown for any storage failure; the draft was already valid, so there is nothing to fix field-wise.
pub const STORAGE_FAILED_MESSAGE: &str =
    "Something went wrong. Please try again or call us directly.";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unprocessable(ValidationErrors),
    RateLimited(u64),
    Storage(StorageError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Unprocessable(errors) => {
                write!(f, "Validation failed for {} field(s)", errors.len())
            }
            AppError::RateLimited(retry_after) => {
                write!(f, "Rate Limited: retry after {retry_after}s")
            }
            AppError::Storage(err) => write!(f, "Storage Error: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": msg }))).into_response()
            }
            AppError::Unprocessable(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                axum::Json(json!({
                    "error": "Validation failed",
                    "errors": field_errors_json(&errors),
                })),
            )
                .into_response(),
            AppError::RateLimited(retry_after) => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    axum::Json(json!({
                        "error": format!("Too many submissions. Retry after {retry_after}s"),
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            AppError::Storage(err) => {
                // The pipeline already logged the failure with the submission id.
                tracing::debug!("Responding to storage error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({ "error": STORAGE_FAILED_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}

/// Render validation errors as `{ field: { "code": ..., "message": ... } }`.
pub fn field_errors_json(errors: &ValidationErrors) -> Value {
    let mut map = Map::new();
    for (field, error) in errors.iter() {
        map.insert(
            field.as_str().to_string(),
            json!({
                "code": error.code(),
                "message": error.message(field),
            }),
        );
    }
    Value::Object(map)
}
