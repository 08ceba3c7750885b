use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chat::engine::TurnError;

/// Shown to visitors whenever a turn fails; details stay in the logs.
pub const GENERIC_TURN_FAILURE: &str =
    "Sorry, I couldn't answer that right now. Please try again in a moment.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Chat turn failed: {0}")]
    Turn(#[from] TurnError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Turn(e) => {
                tracing::error!("Chat turn failed: {e}");
                let (status, code) = match e {
                    TurnError::Completion(_) => (StatusCode::BAD_GATEWAY, "COMPLETION_ERROR"),
                    TurnError::ToolArguments(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "TOOL_ARGUMENT_ERROR")
                    }
                    TurnError::ToolLoopExceeded { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "TOOL_LOOP_EXCEEDED")
                    }
                    TurnError::EmptyReply => (StatusCode::BAD_GATEWAY, "EMPTY_REPLY"),
                };
                (status, code, GENERIC_TURN_FAILURE.to_string())
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
