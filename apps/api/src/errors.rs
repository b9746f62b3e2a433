use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::result_parser::ParseError;
use crate::ingest::IngestError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant is recoverable: the user can retry with new input.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Ingest(e) => match e {
                IngestError::UnsupportedFormat(_) => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_FORMAT",
                    e.to_string(),
                ),
                IngestError::SizeLimitExceeded { .. } => (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "SIZE_LIMIT_EXCEEDED",
                    e.to_string(),
                ),
                IngestError::ExtractionFailed(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    e.to_string(),
                ),
            },
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                match e {
                    LlmError::ApiUnavailable(_) => (
                        StatusCode::BAD_GATEWAY,
                        "API_UNAVAILABLE",
                        "Error connecting to AI service. Please try again later".to_string(),
                    ),
                    LlmError::RateLimited { .. } => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "RATE_LIMITED",
                        "The AI service is busy. Please wait a moment and try again".to_string(),
                    ),
                    LlmError::InvalidResponse(_) => (
                        StatusCode::BAD_GATEWAY,
                        "INVALID_RESPONSE",
                        "The AI service returned an unusable response. Please try again"
                            .to_string(),
                    ),
                }
            }
            AppError::Parse(e) => {
                tracing::warn!("Model reply rejected: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PARSE_ERROR",
                    format!("Error during analysis: {e}. Please try again"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
