use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::tracking::{ProgressEntryRow, TimeSessionRow};
use crate::skill_paths::get_owned_path;
use crate::state::AppState;
use crate::tracking::session_minutes;

const ACTIVITY_TYPES: &[&str] = &["study", "practice", "review", "project"];

#[derive(Debug, Deserialize)]
pub struct CreateProgressRequest {
    pub skill_path_id: Uuid,
    #[serde(default)]
    pub hours_spent: i32,
    #[serde(default)]
    pub topics_covered: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub completion_percentage: i32,
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    #[serde(default)]
    pub skill_path_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub skill_path_id: Uuid,
    #[serde(default = "default_activity")]
    pub activity_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_activity() -> String {
    "study".to_string()
}

/// A finished session can no longer be ended; it is reported exactly like a
/// missing or foreign one so callers cannot tell the cases apart.
fn ensure_open(session: &TimeSessionRow) -> Result<(), AppError> {
    if session.ended_at.is_some() {
        return Err(AppError::NotFound(format!(
            "Session {} not found",
            session.id
        )));
    }
    Ok(())
}

/// POST /api/v1/progress
pub async fn handle_create_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateProgressRequest>,
) -> Result<(StatusCode, Json<ProgressEntryRow>), AppError> {
    let path = get_owned_path(&state.db, req.skill_path_id, auth.user_id).await?;

    if req.hours_spent < 0 {
        return Err(AppError::Validation(
            "hours_spent cannot be negative".to_string(),
        ));
    }
    if !(0..=100).contains(&req.completion_percentage) {
        return Err(AppError::Validation(
            "completion_percentage must be between 0 and 100".to_string(),
        ));
    }

    let entry = sqlx::query_as::<_, ProgressEntryRow>(
        r#"
        INSERT INTO progress_entries
            (id, user_id, skill_path_id, hours_spent, topics_covered, notes,
             completion_percentage, entry_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(path.id)
    .bind(req.hours_spent)
    .bind(&req.topics_covered)
    .bind(&req.notes)
    .bind(req.completion_percentage)
    .bind(req.entry_date.unwrap_or_else(|| Utc::now().date_naive()))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/progress/:skill_path_id
pub async fn handle_list_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(skill_path_id): Path<Uuid>,
) -> Result<Json<Vec<ProgressEntryRow>>, AppError> {
    let path = get_owned_path(&state.db, skill_path_id, auth.user_id).await?;

    let entries = sqlx::query_as::<_, ProgressEntryRow>(
        r#"
        SELECT * FROM progress_entries
        WHERE skill_path_id = $1
        ORDER BY entry_date DESC, created_at DESC
        "#,
    )
    .bind(path.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// POST /api/v1/time-tracking/start
pub async fn handle_start_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<TimeSessionRow>), AppError> {
    let path = get_owned_path(&state.db, req.skill_path_id, auth.user_id).await?;

    if !ACTIVITY_TYPES.contains(&req.activity_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Unknown activity_type '{}'",
            req.activity_type
        )));
    }

    let session = sqlx::query_as::<_, TimeSessionRow>(
        r#"
        INSERT INTO time_sessions (id, user_id, skill_path_id, started_at, activity_type, notes)
        VALUES ($1, $2, $3, now(), $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(path.id)
    .bind(&req.activity_type)
    .bind(&req.notes)
    .fetch_one(&state.db)
    .await?;

    info!("Started {} session {}", session.activity_type, session.id);
    Ok((StatusCode::CREATED, Json(session)))
}

/// PUT /api/v1/time-tracking/:id/end
pub async fn handle_end_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TimeSessionRow>, AppError> {
    let session = sqlx::query_as::<_, TimeSessionRow>(
        "SELECT * FROM time_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(session_id)
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    ensure_open(&session)?;

    let ended_at = Utc::now();
    let duration = session_minutes(session.started_at, ended_at);

    let updated = sqlx::query_as::<_, TimeSessionRow>(
        r#"
        UPDATE time_sessions
        SET ended_at = $2, duration_minutes = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(session.id)
    .bind(ended_at)
    .bind(duration)
    .fetch_one(&state.db)
    .await?;

    info!("Ended session {} after {duration} minutes", session.id);
    Ok(Json(updated))
}

/// GET /api/v1/time-tracking?skill_path_id=
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Value>, AppError> {
    let sessions = sqlx::query_as::<_, TimeSessionRow>(
        r#"
        SELECT * FROM time_sessions
        WHERE user_id = $1
          AND ($2::UUID IS NULL OR skill_path_id = $2)
        ORDER BY started_at DESC
        "#,
    )
    .bind(auth.user_id)
    .bind(query.skill_path_id)
    .fetch_all(&state.db)
    .await?;

    let total_minutes: i64 = sessions
        .iter()
        .filter_map(|s| s.duration_minutes)
        .map(i64::from)
        .sum();

    Ok(Json(json!({
        "sessions": sessions,
        "total_minutes": total_minutes,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(ended: bool) -> TimeSessionRow {
        let started_at = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        TimeSessionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            skill_path_id: Uuid::new_v4(),
            started_at,
            ended_at: ended.then(|| started_at + chrono::Duration::minutes(30)),
            duration_minutes: ended.then_some(30),
            activity_type: "study".to_string(),
            notes: None,
            created_at: started_at,
        }
    }

    #[test]
    fn test_open_session_can_be_ended() {
        assert!(ensure_open(&session(false)).is_ok());
    }

    #[test]
    fn test_ended_session_reports_not_found() {
        let err = ensure_open(&session(true)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
