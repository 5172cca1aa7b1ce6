// All LLM prompt constants for the Resources module.

/// Resource recommendation prompt template.
/// Replace: {topic}, {difficulty}
pub const RESOURCES_PROMPT_TEMPLATE: &str = r#"Recommend learning resources for {topic} at {difficulty} level.

Return a JSON object with EXACTLY these keys, each a list of 3-5 strings
formatted as "Name - one-line description":
{
  "videos": [],
  "articles": [],
  "courses": [],
  "books": [],
  "tools": []
}"#;
