use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::export::csv_row;
use crate::models::skill_path::SkillPathRow;
use crate::roadmap::generator::{regenerate_week_goals, RegenerateMode, RoadmapWeek};
use crate::skill_paths::{get_owned_path, roadmap_weeks, seed_planner_tasks, seed_week_tasks};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSkillPathRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Roadmap blob, normally the body returned by the roadmap generator.
    pub roadmap: Value,
    /// Defaults to today.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSkillPathRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub roadmap: Option<Value>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SkillPathSummary {
    #[serde(flatten)]
    pub path: SkillPathRow,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub progress_percent: f64,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateWeekRequest {
    pub week: u32,
    pub mode: RegenerateMode,
}

#[derive(Debug, Serialize)]
pub struct RegenerateWeekResponse {
    pub week: u32,
    pub goals: Vec<String>,
    pub tasks_reseeded: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/v1/skill-paths
pub async fn handle_list_paths(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SkillPathSummary>>, AppError> {
    let paths = sqlx::query_as::<_, SkillPathRow>(
        "SELECT * FROM skill_paths WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;

    let counts: Vec<(Uuid, i64, i64)> = sqlx::query_as(
        r#"
        SELECT t.skill_path_id,
               COUNT(*),
               COUNT(*) FILTER (WHERE t.status = 'complete')
        FROM planner_tasks t
        JOIN skill_paths p ON p.id = t.skill_path_id
        WHERE p.user_id = $1
        GROUP BY t.skill_path_id
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;

    let summaries = paths
        .into_iter()
        .map(|path| {
            let (total, completed) = counts
                .iter()
                .find(|(id, _, _)| *id == path.id)
                .map(|(_, total, completed)| (*total, *completed))
                .unwrap_or((0, 0));
            SkillPathSummary {
                path,
                total_tasks: total,
                completed_tasks: completed,
                progress_percent: progress_percent(completed, total),
            }
        })
        .collect();

    Ok(Json(summaries))
}

/// POST /api/v1/skill-paths
pub async fn handle_create_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateSkillPathRequest>,
) -> Result<(StatusCode, Json<SkillPathRow>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    let weeks = roadmap_weeks(&req.roadmap);
    if weeks.is_empty() {
        return Err(AppError::Validation(
            "roadmap must contain at least one week".to_string(),
        ));
    }

    let start_date = req.start_date.unwrap_or_else(|| Utc::now().date_naive());
    let path = sqlx::query_as::<_, SkillPathRow>(
        r#"
        INSERT INTO skill_paths (id, user_id, title, description, roadmap, start_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(&req.roadmap)
    .bind(start_date)
    .fetch_one(&state.db)
    .await?;

    seed_planner_tasks(&state.db, &state.llm, &path, &weeks).await?;
    info!("Created skill path {} for user {}", path.id, auth.user_id);

    Ok((StatusCode::CREATED, Json(path)))
}

/// GET /api/v1/skill-paths/:id
pub async fn handle_get_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path_id): Path<Uuid>,
) -> Result<Json<SkillPathRow>, AppError> {
    let mut path = get_owned_path(&state.db, path_id, auth.user_id).await?;
    // Unreadable stored roadmaps are served as an empty plan, not a 500.
    if path.roadmap.get("weeks").and_then(Value::as_array).is_none() {
        path.roadmap = json!({ "weeks": [] });
    }
    Ok(Json(path))
}

/// PUT /api/v1/skill-paths/:id
pub async fn handle_update_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path_id): Path<Uuid>,
    Json(req): Json<UpdateSkillPathRequest>,
) -> Result<Json<SkillPathRow>, AppError> {
    let path = get_owned_path(&state.db, path_id, auth.user_id).await?;

    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
    }

    let updated = sqlx::query_as::<_, SkillPathRow>(
        r#"
        UPDATE skill_paths
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            roadmap = COALESCE($4, roadmap),
            start_date = COALESCE($5, start_date),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(path.id)
    .bind(req.title.as_deref().map(str::trim))
    .bind(&req.description)
    .bind(&req.roadmap)
    .bind(req.start_date)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/skill-paths/:id
pub async fn handle_delete_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let path = get_owned_path(&state.db, path_id, auth.user_id).await?;

    // Planner tasks, progress entries and sessions go with it via FK cascade.
    sqlx::query("DELETE FROM skill_paths WHERE id = $1")
        .bind(path.id)
        .execute(&state.db)
        .await?;

    info!("Deleted skill path {} for user {}", path.id, auth.user_id);
    Ok(Json(json!({ "deleted": path.id })))
}

/// POST /api/v1/skill-paths/:id/regenerate-week
///
/// Rewrites one week's goals via the LLM, stores the updated roadmap, and
/// replaces that week's planner tasks with a fresh seeding.
pub async fn handle_regenerate_week(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path_id): Path<Uuid>,
    Json(req): Json<RegenerateWeekRequest>,
) -> Result<Json<RegenerateWeekResponse>, AppError> {
    let path = get_owned_path(&state.db, path_id, auth.user_id).await?;

    let mut weeks = roadmap_weeks(&path.roadmap);
    let week_entry = weeks
        .iter_mut()
        .find(|w| w.week == req.week)
        .ok_or_else(|| AppError::NotFound(format!("Week {} not found in roadmap", req.week)))?;

    let new_goals =
        regenerate_week_goals(&state.llm, &path.title, &week_entry.goals, req.mode).await?;
    week_entry.goals = new_goals.clone();

    let mut roadmap = path.roadmap.clone();
    roadmap["weeks"] = serde_json::to_value(&weeks)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("roadmap serialization: {e}")))?;

    sqlx::query("UPDATE skill_paths SET roadmap = $2, updated_at = NOW() WHERE id = $1")
        .bind(path.id)
        .bind(&roadmap)
        .execute(&state.db)
        .await?;

    sqlx::query("DELETE FROM planner_tasks WHERE skill_path_id = $1 AND week = $2")
        .bind(path.id)
        .bind(req.week as i32)
        .execute(&state.db)
        .await?;

    let week = RoadmapWeek {
        week: req.week,
        goals: new_goals.clone(),
    };
    let tasks_reseeded = seed_week_tasks(&state.db, &state.llm, &path, &week).await?;

    info!(
        "Regenerated week {} of skill path {} ({:?})",
        req.week, path.id, req.mode
    );
    Ok(Json(RegenerateWeekResponse {
        week: req.week,
        goals: new_goals,
        tasks_reseeded,
    }))
}

/// GET /api/v1/skill-paths/:id/export
///
/// `?format=csv` downloads the roadmap as week/goal rows; anything else
/// returns the stored roadmap JSON.
pub async fn handle_export_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let path = get_owned_path(&state.db, path_id, auth.user_id).await?;

    if query.format.as_deref() != Some("csv") {
        return Ok(Json(path.roadmap).into_response());
    }

    let csv = roadmap_to_csv(&path.roadmap);
    let filename = format!("attachment; filename=\"{}.csv\"", sanitize_filename(&path.title));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    )
        .into_response())
}

fn progress_percent(completed: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (completed as f64 / total as f64 * 1000.0).round() / 10.0
    }
}

fn roadmap_to_csv(roadmap: &Value) -> String {
    let mut lines = vec![csv_row(&["week", "goal"])];
    for week in roadmap_weeks(roadmap) {
        let week_str = week.week.to_string();
        for goal in &week.goals {
            lines.push(csv_row(&[&week_str, goal]));
        }
    }
    lines.join("\n") + "\n"
}

fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "skill_path".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent_rounds_to_one_decimal() {
        assert_eq!(progress_percent(1, 3), 33.3);
        assert_eq!(progress_percent(2, 3), 66.7);
        assert_eq!(progress_percent(7, 7), 100.0);
    }

    #[test]
    fn test_progress_percent_zero_total() {
        assert_eq!(progress_percent(0, 0), 0.0);
    }

    #[test]
    fn test_roadmap_to_csv_rows() {
        let roadmap = json!({
            "weeks": [
                {"week": 1, "goals": ["Read docs", "Set up, then build"]},
                {"week": 2, "goals": ["Ship it"]}
            ]
        });
        let csv = roadmap_to_csv(&roadmap);
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines[0], "week,goal");
        assert_eq!(lines[1], "1,Read docs");
        assert_eq!(lines[2], "1,\"Set up, then build\"");
        assert_eq!(lines[3], "2,Ship it");
    }

    #[test]
    fn test_roadmap_to_csv_empty_plan_is_header_only() {
        let csv = roadmap_to_csv(&json!({"weeks": []}));
        assert_eq!(csv, "week,goal\n");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Rust in 8 Weeks!"), "Rust_in_8_Weeks_");
        assert_eq!(sanitize_filename(""), "skill_path");
    }
}
