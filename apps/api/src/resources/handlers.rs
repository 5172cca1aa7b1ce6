use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::history::record_history;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, RESOURCE_RECOMMENDER_SYSTEM};
use crate::llm_client::repair::{salvage_arrays, strip_json_fences};
use crate::models::history::ResourceRecommendationRow;
use crate::resources::prompts::RESOURCES_PROMPT_TEMPLATE;
use crate::resources::{normalize_resources, RESOURCE_CATEGORIES};
use crate::state::AppState;

const DIFFICULTIES: &[&str] = &["beginner", "intermediate", "advanced"];

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub topic: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ListRecommendationsQuery {
    #[serde(default)]
    pub topic: Option<String>,
}

/// POST /api/v1/resources
///
/// Resource lists come back from the model as loose JSON; a strict parse is
/// tried first and the per-key array salvage second, so the response always
/// carries every category key.
pub async fn handle_recommend_resources(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RecommendRequest>,
) -> Result<(StatusCode, Json<ResourceRecommendationRow>), AppError> {
    if req.topic.trim().is_empty() {
        return Err(AppError::Validation("topic is required".to_string()));
    }
    if !DIFFICULTIES.contains(&req.difficulty.as_str()) {
        return Err(AppError::Validation(format!(
            "Unknown difficulty '{}'",
            req.difficulty
        )));
    }

    let prompt = RESOURCES_PROMPT_TEMPLATE
        .replace("{topic}", req.topic.trim())
        .replace("{difficulty}", &req.difficulty);
    let system = format!("{RESOURCE_RECOMMENDER_SYSTEM} {JSON_ONLY_INSTRUCTION}");

    let text = state
        .llm
        .call_text(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Resource recommendation failed: {e}")))?;

    let raw: Value = match serde_json::from_str(strip_json_fences(&text)) {
        Ok(value) => value,
        Err(e) => {
            warn!("Resource payload parse failed ({e}); salvaging arrays");
            salvage_arrays(&text, RESOURCE_CATEGORIES)
        }
    };
    let resources = normalize_resources(&raw);

    let row = sqlx::query_as::<_, ResourceRecommendationRow>(
        r#"
        INSERT INTO resource_recommendations (id, user_id, topic, difficulty, resources)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(req.topic.trim())
    .bind(&req.difficulty)
    .bind(&resources)
    .fetch_one(&state.db)
    .await?;

    record_history(
        &state.db,
        auth.user_id,
        "resources",
        json!({ "topic": req.topic, "difficulty": req.difficulty }),
        resources,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/resources
pub async fn handle_list_recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListRecommendationsQuery>,
) -> Result<Json<Vec<ResourceRecommendationRow>>, AppError> {
    let rows = sqlx::query_as::<_, ResourceRecommendationRow>(
        r#"
        SELECT * FROM resource_recommendations
        WHERE user_id = $1
          AND ($2::TEXT IS NULL OR topic ILIKE '%' || $2 || '%')
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth.user_id)
    .bind(&query.topic)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}
