use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::evaluation::EvaluationError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Rate limit exceeded. Please wait a few seconds between evaluations.".to_string(),
            ),
            AppError::Evaluation(e) => {
                tracing::error!("Evaluation error: {e}");
                let (status, code) = evaluation_status(e);
                (
                    status,
                    code,
                    "The evaluation could not be completed".to_string(),
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
        };

        let body = Json(json!({
            "status": "error",
            "error": {
                "code": code,
                "message": message
            },
            "timestamp": Utc::now().to_rfc3339()
        }));

        (status, body).into_response()
    }
}

/// Maps core failure kinds to HTTP status. Raw model text never leaves the server.
fn evaluation_status(error: &EvaluationError) -> (StatusCode, &'static str) {
    match error {
        EvaluationError::Parse(_) => (StatusCode::BAD_GATEWAY, "MODEL_OUTPUT_INVALID"),
        EvaluationError::Llm(LlmError::Configuration(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "AI_NOT_CONFIGURED")
        }
        EvaluationError::Llm(LlmError::Transient { .. }) => {
            (StatusCode::SERVICE_UNAVAILABLE, "AI_UNAVAILABLE")
        }
        EvaluationError::Llm(LlmError::Fatal { .. }) => (StatusCode::BAD_GATEWAY, "AI_PROVIDER_ERROR"),
        EvaluationError::DeadlineExceeded(_) => (StatusCode::GATEWAY_TIMEOUT, "EVALUATION_TIMEOUT"),
    }
}
