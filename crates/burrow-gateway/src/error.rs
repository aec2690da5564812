use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::InvalidShortCode;
use burrow_shortener::ShortenerError;
use serde::Serialize;
use tracing::error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

/// Errors returned to HTTP clients as `{"error": {"code", "message"}}`.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ErrorBody {
            error: ErrorInfo { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::InvalidRequest(message) => AppError::Validation(message),
            ShortenerError::AliasTaken(code) => {
                AppError::Conflict(format!("short code already exists: {code}"))
            }
            ShortenerError::NotFound(code) => {
                AppError::NotFound(format!("short code not found: {code}"))
            }
            ShortenerError::AllocationExhausted { attempts } => {
                error!(attempts, "could not allocate a short code");
                AppError::Internal("could not allocate a short code".to_string())
            }
            dependency @ (ShortenerError::Storage(_) | ShortenerError::Cache(_)) => {
                // Backend details stay in the logs.
                error!(error = %dependency, "dependency failure");
                AppError::Internal("internal server error".to_string())
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort_unstable();
        AppError::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<InvalidShortCode> for AppError {
    fn from(error: InvalidShortCode) -> Self {
        AppError::Validation(error.to_string())
    }
}
