//! Best-effort salvage of malformed LLM JSON output.
//!
//! The model wraps JSON in markdown fences, emits single quotes, leaves
//! trailing commas, or truncates arrays mid-object when it runs out of
//! tokens. Each stage here patches one of those failure modes; the pipeline
//! makes no correctness guarantee beyond "parse more often than strict
//! serde_json would". Every stage is total — no panics on any input.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static FENCED_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid regex"));
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));
static MISSING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}(\s*)\{").expect("valid regex"));
static DOUBLE_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*,").expect("valid regex"));
static ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[[^\[\]]*\]").expect("valid regex"));
static OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{[^{}]*\}").expect("valid regex"));

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Pulls the JSON payload out of surrounding prose: fenced block first,
/// otherwise the span from the first opening bracket to the last closing one.
pub fn extract_json_block(text: &str) -> &str {
    if let Some(caps) = FENCED_JSON_RE.captures(text) {
        if let Some(m) = caps.get(1) {
            return m.as_str().trim();
        }
    }
    let open = text.find(['{', '[']);
    let close = text.rfind(['}', ']']);
    match (open, close) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

/// Patches the quote/comma mistakes the model makes most often:
/// single quotes, trailing commas, missing commas between array objects.
pub fn normalize_punctuation(json_str: &str) -> String {
    let s = json_str.replace('\'', "\"");
    let s = TRAILING_COMMA_RE.replace_all(&s, "$1");
    let s = MISSING_COMMA_RE.replace_all(&s, "},$1{");
    DOUBLE_COMMA_RE.replace_all(&s, ",").into_owned()
}

/// Cuts the string at the last closing bracket. Returns the truncated slice
/// and whether anything was actually dropped; `repair_json` folds the flag
/// into [`Salvaged::lossy`] so callers see the data loss.
pub fn truncate_to_last_close(json_str: &str) -> (&str, bool) {
    match json_str.rfind(['}', ']']) {
        Some(last) => (&json_str[..=last], last != json_str.len() - 1),
        None => (json_str, false),
    }
}

/// Rebuilds every array so it contains only its complete `{...}` objects.
/// A truncated trailing object is silently dropped.
pub fn keep_complete_objects(json_str: &str) -> String {
    ARRAY_RE
        .replace_all(json_str, |caps: &regex::Captures| {
            let arr = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let objects: Vec<&str> = OBJECT_RE.find_iter(arr).map(|m| m.as_str()).collect();
            if objects.is_empty() {
                // Array of scalars — leave untouched.
                arr.to_string()
            } else {
                format!("[{}]", objects.join(","))
            }
        })
        .into_owned()
}

/// Output of the salvage pipeline.
#[derive(Debug)]
pub struct Salvaged {
    pub value: Value,
    /// True when content was discarded to make the payload parse
    /// (a truncated tail or an incomplete trailing object).
    pub lossy: bool,
}

/// Runs the full salvage pipeline. Returns the first stage that yields
/// parseable JSON, or None when nothing can be recovered.
pub fn repair_json(text: &str) -> Option<Salvaged> {
    let block = extract_json_block(strip_json_fences(text));
    let cleaned = normalize_punctuation(block);
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Some(Salvaged {
            value,
            lossy: false,
        });
    }

    let (truncated, dropped_tail) = truncate_to_last_close(&cleaned);
    if let Ok(value) = serde_json::from_str(truncated) {
        return Some(Salvaged {
            value,
            lossy: dropped_tail,
        });
    }

    let rebuilt = keep_complete_objects(truncated);
    let lossy = dropped_tail || rebuilt != truncated;
    serde_json::from_str(&rebuilt)
        .ok()
        .map(|value| Salvaged { value, lossy })
}

/// Last-resort salvage for category-keyed responses: extracts each `"key": [...]`
/// array independently and parses whatever survives. Keys that cannot be
/// recovered come back as empty arrays, so callers always get every key.
pub fn salvage_arrays(text: &str, keys: &[&str]) -> Value {
    let mut map = serde_json::Map::new();
    for key in keys {
        let pattern = format!(r#"(?s)"{}"\s*:\s*(\[[^\]]*\])"#, regex::escape(key));
        let recovered = Regex::new(&pattern)
            .ok()
            .and_then(|re| re.captures(text))
            .and_then(|caps| caps.get(1))
            .and_then(|m| {
                let cleaned = normalize_punctuation(m.as_str());
                serde_json::from_str::<Value>(&cleaned).ok()
            })
            .unwrap_or_else(|| Value::Array(vec![]));
        map.insert(key.to_string(), recovered);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_block_from_prose() {
        let input = "Sure! Here is your roadmap:\n{\"weeks\": []}\nHope that helps.";
        assert_eq!(extract_json_block(input), "{\"weeks\": []}");
    }

    #[test]
    fn test_extract_json_block_prefers_fenced() {
        let input = "intro ```json\n[1, 2]\n``` outro {\"ignored\": true}";
        assert_eq!(extract_json_block(input), "[1, 2]");
    }

    #[test]
    fn test_normalize_punctuation_single_quotes() {
        let fixed = normalize_punctuation("{'title': 'Rust'}");
        let value: Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value["title"], "Rust");
    }

    #[test]
    fn test_normalize_punctuation_trailing_commas() {
        let fixed = normalize_punctuation(r#"{"goals": ["a", "b",], }"#);
        let value: Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value["goals"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_normalize_punctuation_missing_comma_between_objects() {
        let fixed = normalize_punctuation(r#"[{"a": 1} {"b": 2}]"#);
        let value: Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_truncate_to_last_close_flags_dropped_tail() {
        let (kept, dropped) = truncate_to_last_close(r#"{"a": 1} and then some"#);
        assert_eq!(kept, r#"{"a": 1}"#);
        assert!(dropped);
    }

    #[test]
    fn test_truncate_to_last_close_clean_input() {
        let (kept, dropped) = truncate_to_last_close(r#"{"a": 1}"#);
        assert_eq!(kept, r#"{"a": 1}"#);
        assert!(!dropped);
    }

    #[test]
    fn test_keep_complete_objects_drops_truncated_tail() {
        let rebuilt = keep_complete_objects(r#"{"items": [{"a": 1}, {"b": 2}, {"c":]}"#);
        let value: Value = serde_json::from_str(&rebuilt).unwrap();
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_keep_complete_objects_leaves_scalar_arrays() {
        let rebuilt = keep_complete_objects(r#"{"goals": ["read", "practice"]}"#);
        let value: Value = serde_json::from_str(&rebuilt).unwrap();
        assert_eq!(value["goals"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_repair_json_recovers_fenced_single_quoted() {
        let salvaged = repair_json("```json\n{'weeks': [{'week': 1, 'goals': ['a',]},]}\n```")
            .unwrap();
        assert_eq!(salvaged.value["weeks"][0]["week"], 1);
        assert!(!salvaged.lossy);
    }

    #[test]
    fn test_repair_json_recovers_truncated_array() {
        let input = r#"{"videos": [{"title": "Intro", "url": "u"}, {"title": "Mid""#;
        // Truncation cuts at the last complete object; the partial one is lost.
        let salvaged = repair_json(input);
        // Not all truncations are recoverable — but the call must not panic.
        if let Some(s) = salvaged {
            assert!(s.value.get("videos").is_some() || s.value.is_array());
            assert!(s.lossy);
        }
    }

    #[test]
    fn test_repair_json_flags_dropped_objects() {
        let salvaged = repair_json(r#"{"items": [{"a": 1}, {"b": 2}, {"c":]}"#).unwrap();
        assert_eq!(salvaged.value["items"].as_array().unwrap().len(), 2);
        assert!(salvaged.lossy);
    }

    #[test]
    fn test_repair_json_gives_up_on_prose() {
        assert!(repair_json("I could not produce a roadmap, sorry.").is_none());
    }

    #[test]
    fn test_salvage_arrays_recovers_intact_keys() {
        let input = r#"{"videos": [{"title": "A"}], "articles": [{"title": "B"}, {"bro"#;
        let value = salvage_arrays(input, &["videos", "articles", "books"]);
        assert_eq!(value["videos"].as_array().unwrap().len(), 1);
        assert_eq!(value["articles"].as_array().unwrap().len(), 0); // unparseable
        assert_eq!(value["books"].as_array().unwrap().len(), 0); // absent
    }

    #[test]
    fn test_salvage_arrays_always_returns_every_key() {
        let value = salvage_arrays("garbage", &["videos", "tools"]);
        assert!(value["videos"].is_array());
        assert!(value["tools"].is_array());
    }
}
