//! Free-form learning-assistant chat. One LLM round trip, both sides persisted.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::llm_client::prompts::LEARNING_COACH_SYSTEM;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }

    let response = state
        .llm
        .call_text(&req.message, LEARNING_COACH_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Chat failed: {e}")))?;

    sqlx::query(
        "INSERT INTO chat_messages (id, user_id, message, response) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(&req.message)
    .bind(&response)
    .execute(&state.db)
    .await?;

    Ok(Json(ChatResponse { response }))
}
