use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::analytics::{fold_task_stats, TaskStats};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, LEARNING_COACH_SYSTEM};
use crate::models::tracking::ProgressEntryRow;
use crate::skill_paths::get_owned_path;
use crate::state::AppState;

const SUGGESTIONS_PROMPT_TEMPLATE: &str = r#"A learner is working through "{title}".
Tasks: {complete} complete, {pending} pending, {deferred} deferred.
Total study time so far: {minutes} minutes.
Recently covered topics: {topics}.

Give 3 short, concrete suggestions to improve their learning routine.
Return a JSON object: {"suggestions": ["...", "...", "..."]}"#;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub skill_path_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PathStatsResponse {
    pub skill_path_id: Uuid,
    pub tasks: TaskStats,
    pub total_minutes: i64,
    pub progress_entries: i64,
}

#[derive(Debug, Deserialize)]
struct SuggestionsResponse {
    #[serde(default)]
    suggestions: Vec<String>,
}

async fn status_counts(
    db: &sqlx::PgPool,
    path_id: Uuid,
) -> Result<Vec<(String, i64)>, AppError> {
    let rows = sqlx::query_as(
        "SELECT status, COUNT(*) FROM planner_tasks WHERE skill_path_id = $1 GROUP BY status",
    )
    .bind(path_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Minutes from closed sessions only; open sessions have no duration yet.
async fn total_minutes(
    db: &sqlx::PgPool,
    user_id: Uuid,
    path_id: Option<Uuid>,
) -> Result<i64, AppError> {
    let minutes: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT SUM(duration_minutes)::BIGINT FROM time_sessions
        WHERE user_id = $1
          AND ended_at IS NOT NULL
          AND ($2::UUID IS NULL OR skill_path_id = $2)
        "#,
    )
    .bind(user_id)
    .bind(path_id)
    .fetch_one(db)
    .await?;
    Ok(minutes.unwrap_or(0))
}

/// GET /api/v1/analytics?skill_path_id=
pub async fn handle_path_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<PathStatsResponse>, AppError> {
    let path = get_owned_path(&state.db, query.skill_path_id, auth.user_id).await?;

    let tasks = fold_task_stats(&status_counts(&state.db, path.id).await?);
    let minutes = total_minutes(&state.db, auth.user_id, Some(path.id)).await?;

    let progress_entries: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM progress_entries WHERE skill_path_id = $1")
            .bind(path.id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(PathStatsResponse {
        skill_path_id: path.id,
        tasks,
        total_minutes: minutes,
        progress_entries,
    }))
}

/// GET /api/v1/analytics/suggestions?skill_path_id=
///
/// Advice is best-effort: an LLM failure degrades to an empty list with a
/// note, never an error status.
pub async fn handle_suggestions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<Value>, AppError> {
    let path = get_owned_path(&state.db, query.skill_path_id, auth.user_id).await?;

    let stats = fold_task_stats(&status_counts(&state.db, path.id).await?);
    let minutes = total_minutes(&state.db, auth.user_id, Some(path.id)).await?;

    let topics: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT unnest(topics_covered) FROM progress_entries
        WHERE skill_path_id = $1
        LIMIT 20
        "#,
    )
    .bind(path.id)
    .fetch_all(&state.db)
    .await?;

    let prompt = SUGGESTIONS_PROMPT_TEMPLATE
        .replace("{title}", &path.title)
        .replace("{complete}", &stats.complete.to_string())
        .replace("{pending}", &stats.pending.to_string())
        .replace("{deferred}", &stats.deferred.to_string())
        .replace("{minutes}", &minutes.to_string())
        .replace("{topics}", &topics.join(", "));
    let system = format!("{LEARNING_COACH_SYSTEM} {JSON_ONLY_INSTRUCTION}");

    match state.llm.call_json::<SuggestionsResponse>(&prompt, &system).await {
        Ok(response) => Ok(Json(json!({ "suggestions": response.suggestions }))),
        Err(e) => {
            warn!("Suggestion generation failed for path {}: {e}", path.id);
            Ok(Json(json!({
                "suggestions": [],
                "note": "Suggestions are temporarily unavailable"
            })))
        }
    }
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let total_paths: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM skill_paths WHERE user_id = $1")
            .bind(auth.user_id)
            .fetch_one(&state.db)
            .await?;

    let task_rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT t.status, COUNT(*) FROM planner_tasks t
        JOIN skill_paths p ON p.id = t.skill_path_id
        WHERE p.user_id = $1
        GROUP BY t.status
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;
    let tasks = fold_task_stats(&task_rows);

    let minutes = total_minutes(&state.db, auth.user_id, None).await?;

    let quiz_attempts: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE user_id = $1")
            .bind(auth.user_id)
            .fetch_one(&state.db)
            .await?;

    let recent_progress = sqlx::query_as::<_, ProgressEntryRow>(
        r#"
        SELECT * FROM progress_entries
        WHERE user_id = $1
        ORDER BY entry_date DESC, created_at DESC
        LIMIT 5
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({
        "total_skill_paths": total_paths,
        "tasks": tasks,
        "total_minutes": minutes,
        "quiz_attempts": quiz_attempts,
        "recent_progress": recent_progress,
    })))
}
