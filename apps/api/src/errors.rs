use std::time::Duration;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::matching::validator::NormalizeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model call timed out after {0:?}")]
    ModelTimeout(Duration),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            AppError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            AppError::ModelTimeout(_) => "MODEL_TIMEOUT",
            AppError::InvalidModelOutput(_) => "INVALID_MODEL_OUTPUT",
            AppError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout(after) => AppError::ModelTimeout(after),
            other => AppError::ModelUnavailable(other.to_string()),
        }
    }
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::InvalidModelOutput { .. } => {
                AppError::InvalidModelOutput(err.to_string())
            }
            NormalizeError::MalformedResponse(msg) => AppError::MalformedResponse(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::UnsupportedMediaType(rejection.body_text())
            }
            other => AppError::Validation(other.body_text()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone())
            }
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model invocation failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Model invocation failed: {msg}"),
                )
            }
            AppError::ModelTimeout(after) => {
                tracing::error!("Model call timed out after {after:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Model did not respond within {}s", after.as_secs()),
                )
            }
            AppError::InvalidModelOutput(msg) => {
                tracing::error!("Model returned invalid JSON: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Model response was not valid JSON: {msg}"),
                )
            }
            AppError::MalformedResponse(msg) => {
                tracing::error!("Model response failed validation: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing model response: {msg}"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
