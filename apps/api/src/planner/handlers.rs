use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::skill_path::PlannerTaskRow;
use crate::planner::schedule::{iso_week_of, shift_dates};
use crate::skill_paths::get_owned_path;
use crate::state::AppState;

const TASK_STATUSES: &[&str] = &["pending", "complete", "deferred"];

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub skill_path_id: Uuid,
    #[serde(default)]
    pub week: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeekViewQuery {
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub skill_path_id: Uuid,
    pub week: i32,
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub rescheduled_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ShiftPendingRequest {
    pub skill_path_id: Uuid,
    pub week: i32,
}

#[derive(Debug, Serialize)]
pub struct WeekViewResponse {
    pub week: u32,
    pub tasks: Vec<PlannerTaskRow>,
}

#[derive(Debug, Serialize)]
pub struct ShiftPendingResponse {
    pub shifted: usize,
    pub tasks: Vec<PlannerTaskRow>,
}

fn validate_status(status: &str) -> Result<(), AppError> {
    if TASK_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Unknown status '{status}'")))
    }
}

/// Fetches a planner task, enforcing ownership through its skill path.
async fn get_owned_task(
    db: &sqlx::PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<PlannerTaskRow, AppError> {
    sqlx::query_as::<_, PlannerTaskRow>(
        r#"
        SELECT t.* FROM planner_tasks t
        JOIN skill_paths p ON p.id = t.skill_path_id
        WHERE t.id = $1 AND p.user_id = $2
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Task {task_id} not found")))
}

/// GET /api/v1/planner?skill_path_id=&week=&status=
pub async fn handle_list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<PlannerTaskRow>>, AppError> {
    let path = get_owned_path(&state.db, query.skill_path_id, auth.user_id).await?;

    if let Some(status) = &query.status {
        validate_status(status)?;
    }

    let tasks = sqlx::query_as::<_, PlannerTaskRow>(
        r#"
        SELECT * FROM planner_tasks
        WHERE skill_path_id = $1
          AND ($2::INT IS NULL OR week = $2)
          AND ($3::TEXT IS NULL OR status = $3)
        ORDER BY week, due_date, created_at
        "#,
    )
    .bind(path.id)
    .bind(query.week)
    .bind(&query.status)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(tasks))
}

/// GET /api/v1/planner/week?date=
///
/// Tasks across all of the caller's paths whose week number matches the ISO
/// week of the given date (today when omitted).
pub async fn handle_week_view(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<WeekViewQuery>,
) -> Result<Json<WeekViewResponse>, AppError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let week = iso_week_of(date);

    let tasks = sqlx::query_as::<_, PlannerTaskRow>(
        r#"
        SELECT t.* FROM planner_tasks t
        JOIN skill_paths p ON p.id = t.skill_path_id
        WHERE p.user_id = $1 AND t.week = $2
        ORDER BY t.due_date, t.created_at
        "#,
    )
    .bind(auth.user_id)
    .bind(week as i32)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(WeekViewResponse { week, tasks }))
}

/// POST /api/v1/planner
pub async fn handle_create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<PlannerTaskRow>), AppError> {
    let path = get_owned_path(&state.db, req.skill_path_id, auth.user_id).await?;

    if req.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }
    if req.week < 1 {
        return Err(AppError::Validation("week must be at least 1".to_string()));
    }

    let task = sqlx::query_as::<_, PlannerTaskRow>(
        r#"
        INSERT INTO planner_tasks (id, skill_path_id, week, description, due_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(path.id)
    .bind(req.week)
    .bind(req.description.trim())
    .bind(req.due_date)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /api/v1/planner/:id
pub async fn handle_update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<PlannerTaskRow>, AppError> {
    let task = get_owned_task(&state.db, task_id, auth.user_id).await?;

    if let Some(status) = &req.status {
        validate_status(status)?;
    }
    if let Some(description) = &req.description {
        if description.trim().is_empty() {
            return Err(AppError::Validation(
                "description cannot be empty".to_string(),
            ));
        }
    }

    let updated = sqlx::query_as::<_, PlannerTaskRow>(
        r#"
        UPDATE planner_tasks
        SET description = COALESCE($2, description),
            status = COALESCE($3, status),
            due_date = COALESCE($4, due_date),
            rescheduled_to = COALESCE($5, rescheduled_to)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(task.id)
    .bind(req.description.as_deref().map(str::trim))
    .bind(&req.status)
    .bind(req.due_date)
    .bind(req.rescheduled_to)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/planner/:id
pub async fn handle_delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let task = get_owned_task(&state.db, task_id, auth.user_id).await?;

    sqlx::query("DELETE FROM planner_tasks WHERE id = $1")
        .bind(task.id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({ "deleted": task.id })))
}

/// POST /api/v1/planner/shift-pending
///
/// Moves every non-complete task of the given week to a fresh consecutive
/// slot after the path's latest due date, recorded in `rescheduled_to`.
/// Original due dates stay untouched so the slip remains visible.
pub async fn handle_shift_pending(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ShiftPendingRequest>,
) -> Result<Json<ShiftPendingResponse>, AppError> {
    let path = get_owned_path(&state.db, req.skill_path_id, auth.user_id).await?;

    let to_shift = sqlx::query_as::<_, PlannerTaskRow>(
        r#"
        SELECT * FROM planner_tasks
        WHERE skill_path_id = $1 AND week = $2 AND status <> 'complete'
        ORDER BY due_date, created_at
        "#,
    )
    .bind(path.id)
    .bind(req.week)
    .fetch_all(&state.db)
    .await?;

    if to_shift.is_empty() {
        return Ok(Json(ShiftPendingResponse {
            shifted: 0,
            tasks: Vec::new(),
        }));
    }

    let latest_due: Option<NaiveDate> = sqlx::query_scalar(
        "SELECT MAX(COALESCE(rescheduled_to, due_date)) FROM planner_tasks WHERE skill_path_id = $1",
    )
    .bind(path.id)
    .fetch_one(&state.db)
    .await?;

    let anchor = latest_due.unwrap_or_else(|| Utc::now().date_naive());
    let new_dates = shift_dates(anchor, to_shift.len());

    let mut tasks = Vec::with_capacity(to_shift.len());
    for (task, new_date) in to_shift.iter().zip(new_dates) {
        let updated = sqlx::query_as::<_, PlannerTaskRow>(
            "UPDATE planner_tasks SET rescheduled_to = $2 WHERE id = $1 RETURNING *",
        )
        .bind(task.id)
        .bind(new_date)
        .fetch_one(&state.db)
        .await?;
        tasks.push(updated);
    }

    info!(
        "Shifted {} tasks of week {} on skill path {}",
        tasks.len(),
        req.week,
        path.id
    );
    Ok(Json(ShiftPendingResponse {
        shifted: tasks.len(),
        tasks,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_status() {
        assert!(validate_status("pending").is_ok());
        assert!(validate_status("complete").is_ok());
        assert!(validate_status("deferred").is_ok());
        assert!(validate_status("done").is_err());
        assert!(validate_status("").is_err());
    }

    #[test]
    fn test_week_view_query_date_optional() {
        let query: WeekViewQuery = serde_json::from_str("{}").unwrap();
        assert!(query.date.is_none());
        let query: WeekViewQuery = serde_json::from_str(r#"{"date": "2025-06-04"}"#).unwrap();
        assert_eq!(
            query.date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 4).unwrap())
        );
    }
}
