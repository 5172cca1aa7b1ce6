//! User history — roadmap generations and resource lookups append here so
//! the dashboard can replay past results without re-calling the LLM.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;

pub mod handlers;

/// Appends a {kind, input, result} row to the caller's history.
pub async fn record_history(
    pool: &PgPool,
    user_id: Uuid,
    kind: &str,
    input: serde_json::Value,
    result: serde_json::Value,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO history_entries (id, user_id, kind, input, result) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(kind)
    .bind(input)
    .bind(result)
    .execute(pool)
    .await?;
    Ok(())
}
