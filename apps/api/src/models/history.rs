use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// roadmap | replan | quiz | resources
    pub kind: String,
    pub input: Value,
    pub result: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResourceRecommendationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub difficulty: String,
    pub resources: Value,
    pub created_at: DateTime<Utc>,
}
