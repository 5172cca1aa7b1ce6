// All LLM prompt constants for the Roadmap module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Roadmap generation prompt template.
/// Replace: {topic}, {level}, {duration_weeks}, {hours_per_week}, {goal_part}
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"Generate a {duration_weeks}-week learning roadmap for {topic} at {level} level. Assume the learner has {hours_per_week} hours available per week.{goal_part}
For each week, list 2-4 specific learning goals or tasks.

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "Roadmap title",
  "description": "One-paragraph summary of the plan",
  "weeks": [
    {"week": 1, "goals": ["goal 1", "goal 2"]}
  ]
}

Week numbers start at 1 and must be consecutive."#;

/// Daily breakdown prompt template.
/// Replace: {week}, {goals_json}
pub const DAILY_BREAKDOWN_PROMPT_TEMPLATE: &str = r#"Given these goals for Week {week}: {goals_json}, break them down into 7 daily tasks (one for each day, Monday to Sunday).

Return a JSON array of exactly 7 strings."#;

/// Catch-up suggestion prompt template.
/// Replace: {topic}
pub const CATCH_UP_PROMPT_TEMPLATE: &str = r#"Generate catch-up suggestions for incomplete tasks in {topic} learning.

Return a JSON object with this structure:
{
  "catch_up_suggestions": ["suggestion 1", "suggestion 2"]
}"#;

/// Week regeneration prompt template (mode = deeper).
/// Replace: {title}, {goals_json}
pub const REGENERATE_DEEPER_PROMPT_TEMPLATE: &str = r#"Given this learning week for {title}: {goals_json}, expand and go deeper. Break down each goal into more advanced sub-topics or tasks.

Return a JSON array of new goal strings."#;

/// Week regeneration prompt template (mode = easier).
/// Replace: {title}, {goals_json}
pub const REGENERATE_EASIER_PROMPT_TEMPLATE: &str = r#"Given this learning week for {title}: {goals_json}, make it easier and more beginner-friendly. Break down each goal into simpler sub-tasks or easier steps.

Return a JSON array of new goal strings."#;
