//! Axum route handlers for the history API.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::export::csv_row;
use crate::models::history::HistoryEntryRow;
use crate::state::AppState;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// GET /api/v1/history
pub async fn handle_list_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntryRow>>, AppError> {
    let limit = params.limit.clamp(1, 100);
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let entries: Vec<HistoryEntryRow> = match search {
        Some(pattern) => {
            sqlx::query_as(
                r#"
                SELECT * FROM history_entries
                WHERE user_id = $1 AND kind ILIKE $2
                ORDER BY created_at DESC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(auth.user_id)
            .bind(pattern)
            .bind(limit)
            .bind(params.offset.max(0))
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT * FROM history_entries
                WHERE user_id = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(auth.user_id)
            .bind(limit)
            .bind(params.offset.max(0))
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(entries))
}

/// GET /api/v1/history/export?format=csv|json
pub async fn handle_export_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let entries: Vec<HistoryEntryRow> =
        sqlx::query_as("SELECT * FROM history_entries WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(auth.user_id)
            .fetch_all(&state.db)
            .await?;

    if params.format.as_deref() == Some("csv") {
        let mut csv = String::from("kind,input,result\n");
        for entry in &entries {
            csv.push_str(&csv_row(&[
                &entry.kind,
                &entry.input.to_string(),
                &entry.result.to_string(),
            ]));
            csv.push('\n');
        }
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=history.csv",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(entries).into_response())
}

/// DELETE /api/v1/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query("DELETE FROM history_entries WHERE user_id = $1")
        .bind(auth.user_id)
        .execute(&state.db)
        .await?;
    Ok(Json(
        serde_json::json!({ "status": "deleted", "removed": result.rows_affected() }),
    ))
}
