//! Cross-cutting prompt fragments shared by all LLM call sites.

/// Appended to every system prompt whose caller parses the output as JSON.
/// The salvage pipeline in `repair` exists because models ignore this anyway.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System persona for roadmap and planner generation.
pub const LEARNING_COACH_SYSTEM: &str = "You are an expert learning coach.";

/// System persona for roadmap generation.
pub const PATH_GENERATOR_SYSTEM: &str = "You are an expert learning path generator.";

/// System persona for resource recommendation.
pub const RESOURCE_RECOMMENDER_SYSTEM: &str = "You are an expert learning resource recommender.";
