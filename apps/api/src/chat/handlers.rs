//! Axum route handlers for the chat surface.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::chat::prompts::CAPABILITIES;
use crate::errors::AppError;
use crate::models::message::{ChatMessage, HistoryEntry};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub name: String,
    pub summary: String,
    pub capabilities: Vec<&'static str>,
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let history = req
        .history
        .into_iter()
        .map(|entry| {
            let role = entry.role;
            entry.into_message().ok_or_else(|| {
                AppError::Validation(format!(
                    "history may only contain user and assistant messages, got '{}'",
                    role.as_str()
                ))
            })
        })
        .collect::<Result<Vec<ChatMessage>, AppError>>()?;

    let reply = state.engine.run_turn(&history, &req.message).await?;
    Ok(Json(ChatResponse { reply }))
}

/// GET /api/v1/profile
pub async fn handle_profile(State(state): State<AppState>) -> Json<ProfileResponse> {
    let ctx = state.engine.context();
    Json(ProfileResponse {
        name: ctx.name.clone(),
        summary: ctx.summary.clone(),
        capabilities: CAPABILITIES.to_vec(),
    })
}
