//! Axum route handlers for roadmap generation and replanning.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::history::record_history;
use crate::roadmap::generator::{
    catch_up_suggestions, generate_weekly_plan, RoadmapParams, RoadmapPlan,
};
use crate::state::AppState;

fn default_total_weeks() -> u32 {
    12
}

#[derive(Debug, Deserialize)]
pub struct ReplanRequest {
    pub topic: String,
    pub level: String,
    pub current_week: u32,
    #[serde(default = "default_total_weeks")]
    pub total_weeks: u32,
    pub new_hours_per_week: u32,
    #[serde(default)]
    pub completed_tasks: u32,
    #[serde(default)]
    pub expected_tasks: u32,
}

#[derive(Debug, Serialize)]
pub struct ReplanResponse {
    #[serde(flatten)]
    pub plan: RoadmapPlan,
    pub catch_up_suggestions: Vec<String>,
}

/// POST /api/v1/roadmaps/generate
///
/// Generates a multi-week roadmap for a topic. The result is recorded in the
/// caller's history but NOT persisted as a skill path — creating the skill
/// path (and seeding its planner tasks) is a separate, explicit step.
pub async fn handle_generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(params): Json<RoadmapParams>,
) -> Result<Json<RoadmapPlan>, AppError> {
    if params.topic.trim().is_empty() {
        return Err(AppError::Validation("topic cannot be empty".to_string()));
    }
    if params.duration_weeks == 0 {
        return Err(AppError::Validation(
            "duration_weeks must be at least 1".to_string(),
        ));
    }

    let plan = generate_weekly_plan(&state.llm, &params).await?;
    info!(
        "Generated {}-week roadmap for user {} topic '{}'",
        plan.weeks.len(),
        auth.user_id,
        params.topic
    );

    record_history(
        &state.db,
        auth.user_id,
        "roadmap",
        serde_json::json!({
            "topic": params.topic,
            "level": params.level,
            "duration_weeks": params.duration_weeks,
            "hours_per_week": params.hours_per_week,
            "goal": params.goal,
        }),
        serde_json::to_value(&plan).unwrap_or_default(),
    )
    .await?;

    Ok(Json(plan))
}

/// POST /api/v1/roadmaps/replan
///
/// Regenerates the remaining weeks with a new weekly-hours budget. When the
/// learner is behind schedule, catch-up suggestions are requested as well;
/// failure there degrades to an empty list rather than failing the replan.
pub async fn handle_replan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ReplanRequest>,
) -> Result<Json<ReplanResponse>, AppError> {
    if req.topic.trim().is_empty() {
        return Err(AppError::Validation("topic cannot be empty".to_string()));
    }

    let remaining_weeks = req.total_weeks.saturating_sub(req.current_week).max(1);
    let params = RoadmapParams {
        topic: req.topic.clone(),
        level: req.level.clone(),
        duration_weeks: remaining_weeks,
        hours_per_week: req.new_hours_per_week,
        goal: None,
    };

    let plan = generate_weekly_plan(&state.llm, &params).await?;

    let suggestions = if req.completed_tasks < req.expected_tasks {
        catch_up_suggestions(&state.llm, &req.topic).await
    } else {
        Vec::new()
    };

    let response = ReplanResponse {
        plan,
        catch_up_suggestions: suggestions,
    };

    record_history(
        &state.db,
        auth.user_id,
        "replan",
        serde_json::json!({
            "topic": req.topic,
            "level": req.level,
            "current_week": req.current_week,
            "total_weeks": req.total_weeks,
            "new_hours_per_week": req.new_hours_per_week,
        }),
        serde_json::to_value(&response).unwrap_or_default(),
    )
    .await?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replan_request_defaults() {
        let req: ReplanRequest = serde_json::from_str(
            r#"{"topic": "Rust", "level": "beginner", "current_week": 3, "new_hours_per_week": 5}"#,
        )
        .unwrap();
        assert_eq!(req.total_weeks, 12);
        assert_eq!(req.completed_tasks, 0);
        assert_eq!(req.expected_tasks, 0);
    }

    #[test]
    fn test_remaining_weeks_never_zero() {
        // current_week past total_weeks still replans a single week
        let remaining = 12u32.saturating_sub(15).max(1);
        assert_eq!(remaining, 1);
    }
}
