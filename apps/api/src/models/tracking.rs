use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgressEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_path_id: Uuid,
    pub hours_spent: i32,
    pub topics_covered: Vec<String>,
    pub notes: Option<String>,
    pub completion_percentage: i32,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_path_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    /// study | practice | review | project
    pub activity_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
