use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::job_ad::pipeline::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::EmptyInput => AppError::Validation(e.to_string()),
            GenerationError::Completion(_) => AppError::Completion(e.to_string()),
            GenerationError::Parse(ref parse) => {
                warn!(
                    "Unparseable AI reply ({}): {:?}",
                    parse.source,
                    parse.text.chars().take(200).collect::<String>()
                );
                AppError::Parse(format!(
                    "{e}. Try rewording the description and generate again."
                ))
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Completion(msg) => {
                tracing::error!("Completion error: {msg}");
                (StatusCode::BAD_GATEWAY, "COMPLETION_FAILED", msg.clone())
            }
            AppError::Parse(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PARSE_FAILED",
                msg.clone(),
            ),
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
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_empty_input_maps_to_validation() {
        let err: AppError = GenerationError::EmptyInput.into();
        assert!(matches!(err, AppError::Validation(ref m) if !m.is_empty()));
    }

    #[test]
    fn test_completion_failure_maps_to_bad_gateway() {
        let err: AppError = GenerationError::Completion(LlmError::EmptyContent).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_parse_failure_maps_to_unprocessable_with_message() {
        let parse = crate::job_ad::extractor::extract("no payload here").unwrap_err();
        let err: AppError = GenerationError::Parse(parse).into();
        match &err {
            AppError::Parse(msg) => assert!(msg.contains("Try rewording")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
