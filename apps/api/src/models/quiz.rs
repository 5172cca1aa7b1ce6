use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub title: String,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizQuestionRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_text: String,
    /// JSON array of option strings.
    pub options: Value,
    pub correct_option: String,
    pub skill_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttemptRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    /// Map of question id → chosen option.
    pub answers: Value,
    pub score: i32,
    pub total: i32,
    pub attempted_at: DateTime<Utc>,
}
