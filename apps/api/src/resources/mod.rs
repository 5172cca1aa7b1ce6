//! Curated-resource recommendations, keyed by fixed media categories.

use serde_json::{Map, Value};

pub mod handlers;
pub mod prompts;

/// Every recommendation payload carries exactly these keys.
pub const RESOURCE_CATEGORIES: &[&str] = &["videos", "articles", "courses", "books", "tools"];

/// Normalizes an LLM payload into the fixed category shape: every category
/// key present, every value an array of strings, anything else dropped.
pub fn normalize_resources(raw: &Value) -> Value {
    let mut normalized = Map::new();
    for category in RESOURCE_CATEGORIES {
        let items = raw
            .get(category)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| Value::String(s.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        normalized.insert(category.to_string(), Value::Array(items));
    }
    Value::Object(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_keeps_string_lists() {
        let raw = json!({
            "videos": ["Intro - watch this"],
            "articles": ["Guide - read this"],
            "courses": [],
            "books": ["The Book - classic"],
            "tools": ["cargo - build tool"]
        });
        let normalized = normalize_resources(&raw);
        assert_eq!(normalized["videos"], json!(["Intro - watch this"]));
        assert_eq!(normalized["courses"], json!([]));
    }

    #[test]
    fn test_normalize_fills_missing_categories() {
        let normalized = normalize_resources(&json!({"videos": ["a"]}));
        for category in RESOURCE_CATEGORIES {
            assert!(normalized[*category].is_array(), "missing {category}");
        }
        assert_eq!(normalized["books"], json!([]));
    }

    #[test]
    fn test_normalize_drops_non_string_items() {
        let normalized = normalize_resources(&json!({"videos": ["ok", 42, null, {"x": 1}]}));
        assert_eq!(normalized["videos"], json!(["ok"]));
    }

    #[test]
    fn test_normalize_tolerates_wrong_shape() {
        let normalized = normalize_resources(&json!({"videos": "not a list"}));
        assert_eq!(normalized["videos"], json!([]));
    }
}
