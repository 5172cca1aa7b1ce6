//! Roadmap generation — every LLM-backed plan operation lives here.
//!
//! Handlers and the skill-path seeding flow call into this module instead of
//! talking to the LLM client themselves, so prompt/fallback behavior stays in
//! one place.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::{
    JSON_ONLY_INSTRUCTION, LEARNING_COACH_SYSTEM, PATH_GENERATOR_SYSTEM,
};
use crate::llm_client::{CallOptions, LlmClient};
use crate::roadmap::prompts::{
    CATCH_UP_PROMPT_TEMPLATE, DAILY_BREAKDOWN_PROMPT_TEMPLATE, REGENERATE_DEEPER_PROMPT_TEMPLATE,
    REGENERATE_EASIER_PROMPT_TEMPLATE, ROADMAP_PROMPT_TEMPLATE,
};

pub const DAYS_PER_WEEK: usize = 7;

/// A 12-week plan with 2-4 goals per week does not fit the default token
/// budget, and a truncated plan is exactly what the salvage pipeline exists
/// to paper over. Give full-plan generation more room.
const PLAN_MAX_TOKENS: u32 = 4096;

/// One week of a generated roadmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapWeek {
    pub week: u32,
    pub goals: Vec<String>,
}

/// A generated multi-week study plan. Stored opaque on the skill path row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapPlan {
    pub title: String,
    pub description: String,
    pub weeks: Vec<RoadmapWeek>,
}

/// Mode for rewriting a single roadmap week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerateMode {
    Deeper,
    Easier,
}

/// Parameters for roadmap generation.
#[derive(Debug, Clone, Deserialize)]
pub struct RoadmapParams {
    pub topic: String,
    pub level: String,
    pub duration_weeks: u32,
    pub hours_per_week: u32,
    pub goal: Option<String>,
}

/// Generates a multi-week roadmap via the LLM.
pub async fn generate_weekly_plan(
    llm: &LlmClient,
    params: &RoadmapParams,
) -> Result<RoadmapPlan, AppError> {
    let goal_part = params
        .goal
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .map(|g| format!(" The end goal is: {g}."))
        .unwrap_or_default();

    let prompt = ROADMAP_PROMPT_TEMPLATE
        .replace("{topic}", &params.topic)
        .replace("{level}", &params.level)
        .replace("{duration_weeks}", &params.duration_weeks.to_string())
        .replace("{hours_per_week}", &params.hours_per_week.to_string())
        .replace("{goal_part}", &goal_part);

    let system = format!("{PATH_GENERATOR_SYSTEM} {JSON_ONLY_INSTRUCTION}");
    let opts = CallOptions {
        max_tokens: PLAN_MAX_TOKENS,
        ..CallOptions::default()
    };
    llm.call_json_with::<RoadmapPlan>(&prompt, &system, opts)
        .await
        .map_err(|e| AppError::Llm(format!("Roadmap generation failed: {e}")))
}

/// Breaks a week's goals into exactly 7 daily tasks via the LLM.
/// Falls back to round-robin distribution when the model misbehaves —
/// seeding planner tasks must never fail because of the LLM.
pub async fn break_week_into_daily_tasks(
    llm: &LlmClient,
    week: u32,
    goals: &[String],
) -> Vec<String> {
    let goals_json = serde_json::to_string(goals).unwrap_or_else(|_| "[]".to_string());
    let prompt = DAILY_BREAKDOWN_PROMPT_TEMPLATE
        .replace("{week}", &week.to_string())
        .replace("{goals_json}", &goals_json);
    let system = format!("{LEARNING_COACH_SYSTEM} {JSON_ONLY_INSTRUCTION}");

    match llm.call_json::<Vec<String>>(&prompt, &system).await {
        Ok(tasks) if tasks.len() == DAYS_PER_WEEK => tasks,
        Ok(tasks) => {
            warn!(
                "Daily breakdown for week {week} returned {} tasks (expected {DAYS_PER_WEEK}); using fallback",
                tasks.len()
            );
            distribute_goals_over_week(goals)
        }
        Err(e) => {
            warn!("Daily breakdown for week {week} failed ({e}); using fallback");
            distribute_goals_over_week(goals)
        }
    }
}

/// Round-robin fallback: repeat the week's goals across 7 days.
/// An empty goal list yields numbered placeholder tasks.
pub fn distribute_goals_over_week(goals: &[String]) -> Vec<String> {
    (0..DAYS_PER_WEEK)
        .map(|i| {
            if goals.is_empty() {
                format!("Task {}", i + 1)
            } else {
                goals[i % goals.len()].clone()
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CatchUpResponse {
    #[serde(default)]
    catch_up_suggestions: Vec<String>,
}

/// Suggestions for a learner who has fallen behind. Degrades to an empty
/// list on any LLM failure; a replan must not fail over advice.
pub async fn catch_up_suggestions(llm: &LlmClient, topic: &str) -> Vec<String> {
    let prompt = CATCH_UP_PROMPT_TEMPLATE.replace("{topic}", topic);
    let system = format!("{LEARNING_COACH_SYSTEM} {JSON_ONLY_INSTRUCTION}");
    match llm.call_json::<CatchUpResponse>(&prompt, &system).await {
        Ok(response) => response.catch_up_suggestions,
        Err(e) => {
            warn!("Catch-up suggestion generation failed: {e}");
            Vec::new()
        }
    }
}

/// Rewrites one week's goals deeper or easier.
pub async fn regenerate_week_goals(
    llm: &LlmClient,
    path_title: &str,
    goals: &[String],
    mode: RegenerateMode,
) -> Result<Vec<String>, AppError> {
    let goals_json = serde_json::to_string(goals).unwrap_or_else(|_| "[]".to_string());
    let template = match mode {
        RegenerateMode::Deeper => REGENERATE_DEEPER_PROMPT_TEMPLATE,
        RegenerateMode::Easier => REGENERATE_EASIER_PROMPT_TEMPLATE,
    };
    let prompt = template
        .replace("{title}", path_title)
        .replace("{goals_json}", &goals_json);
    let system = format!("{LEARNING_COACH_SYSTEM} {JSON_ONLY_INSTRUCTION}");

    let new_goals: Vec<String> = llm
        .call_json(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Week regeneration failed: {e}")))?;

    if new_goals.is_empty() {
        return Err(AppError::Llm(
            "Week regeneration returned no goals".to_string(),
        ));
    }
    Ok(new_goals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roadmap_plan_deserializes() {
        let json = r#"{
            "title": "Rust in 8 Weeks",
            "description": "From ownership to async.",
            "weeks": [
                {"week": 1, "goals": ["Read the book ch 1-4", "Set up toolchain"]},
                {"week": 2, "goals": ["Ownership exercises"]}
            ]
        }"#;
        let plan: RoadmapPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.weeks.len(), 2);
        assert_eq!(plan.weeks[0].week, 1);
        assert_eq!(plan.weeks[0].goals.len(), 2);
    }

    #[test]
    fn test_regenerate_mode_serde() {
        let mode: RegenerateMode = serde_json::from_str(r#""deeper""#).unwrap();
        assert_eq!(mode, RegenerateMode::Deeper);
        let mode: RegenerateMode = serde_json::from_str(r#""easier""#).unwrap();
        assert_eq!(mode, RegenerateMode::Easier);
    }

    #[test]
    fn test_distribute_goals_round_robin() {
        let goals = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let tasks = distribute_goals_over_week(&goals);
        assert_eq!(tasks.len(), DAYS_PER_WEEK);
        assert_eq!(tasks[0], "a");
        assert_eq!(tasks[3], "a");
        assert_eq!(tasks[5], "c");
    }

    #[test]
    fn test_distribute_goals_empty_yields_placeholders() {
        let tasks = distribute_goals_over_week(&[]);
        assert_eq!(tasks.len(), DAYS_PER_WEEK);
        assert_eq!(tasks[0], "Task 1");
        assert_eq!(tasks[6], "Task 7");
    }

    #[test]
    fn test_catch_up_response_tolerates_missing_field() {
        let response: CatchUpResponse = serde_json::from_str("{}").unwrap();
        assert!(response.catch_up_suggestions.is_empty());
    }
}
