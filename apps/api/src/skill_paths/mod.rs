//! Skill paths — a user's named learning track with its roadmap blob and
//! the planner tasks derived from it.

use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::skill_path::SkillPathRow;
use crate::planner::schedule::daily_due_dates;
use crate::roadmap::generator::{break_week_into_daily_tasks, RoadmapWeek};

pub mod handlers;

/// Fetches a skill path, enforcing ownership. Foreign and missing paths are
/// indistinguishable to the caller (both 404).
pub async fn get_owned_path(
    pool: &PgPool,
    path_id: Uuid,
    user_id: Uuid,
) -> Result<SkillPathRow, AppError> {
    sqlx::query_as::<_, SkillPathRow>("SELECT * FROM skill_paths WHERE id = $1 AND user_id = $2")
        .bind(path_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Skill path {path_id} not found")))
}

/// Extracts the week list from a stored roadmap blob. Stored roadmaps are
/// opaque and occasionally malformed (hand-edited or salvaged LLM output);
/// anything unreadable degrades to no weeks.
pub fn roadmap_weeks(roadmap: &Value) -> Vec<RoadmapWeek> {
    roadmap
        .get("weeks")
        .cloned()
        .and_then(|weeks| serde_json::from_value(weeks).ok())
        .unwrap_or_default()
}

/// Seeds planner tasks for one roadmap week: 7 daily tasks with consecutive
/// due dates. The daily breakdown comes from the LLM with a round-robin
/// fallback, so seeding itself cannot fail on LLM errors.
pub async fn seed_week_tasks(
    pool: &PgPool,
    llm: &LlmClient,
    path: &SkillPathRow,
    week: &RoadmapWeek,
) -> Result<usize, AppError> {
    let daily_tasks = break_week_into_daily_tasks(llm, week.week, &week.goals).await;
    let due_dates = daily_due_dates(path.start_date, week.week);

    for (description, due_date) in daily_tasks.iter().zip(due_dates) {
        sqlx::query(
            r#"
            INSERT INTO planner_tasks (id, skill_path_id, week, description, due_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(path.id)
        .bind(week.week as i32)
        .bind(description)
        .bind(due_date)
        .execute(pool)
        .await?;
    }

    Ok(daily_tasks.len())
}

/// Seeds planner tasks for every week of a freshly created skill path.
pub async fn seed_planner_tasks(
    pool: &PgPool,
    llm: &LlmClient,
    path: &SkillPathRow,
    weeks: &[RoadmapWeek],
) -> Result<usize, AppError> {
    let mut seeded = 0;
    for week in weeks {
        seeded += seed_week_tasks(pool, llm, path, week).await?;
    }
    info!("Seeded {seeded} planner tasks for skill path {}", path.id);
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roadmap_weeks_parses_valid_blob() {
        let roadmap = serde_json::json!({
            "title": "Rust",
            "weeks": [{"week": 1, "goals": ["a"]}, {"week": 2, "goals": []}]
        });
        let weeks = roadmap_weeks(&roadmap);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week, 1);
    }

    #[test]
    fn test_roadmap_weeks_degrades_on_missing_key() {
        assert!(roadmap_weeks(&serde_json::json!({"title": "x"})).is_empty());
    }

    #[test]
    fn test_roadmap_weeks_degrades_on_wrong_shape() {
        assert!(roadmap_weeks(&serde_json::json!({"weeks": "not-a-list"})).is_empty());
        assert!(roadmap_weeks(&serde_json::json!(null)).is_empty());
    }
}
