use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillPathRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Opaque roadmap blob: `{title, description, weeks: [{week, goals}]}`.
    pub roadmap: Value,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlannerTaskRow {
    pub id: Uuid,
    pub skill_path_id: Uuid,
    pub week: i32,
    pub description: String,
    /// pending | complete | deferred
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub rescheduled_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
