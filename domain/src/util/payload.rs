//! Tolerant extraction of structured payloads from free-form model text.
//!
//! Models wrap JSON in fenced code blocks, prepend prose, or append
//! commentary. Extraction tries, in order:
//!
//! 1. fenced code blocks (` ```json ` or bare ` ``` `) whose body parses
//! 2. the whole trimmed text
//! 3. the first balanced `{ ... }` span that parses, scanning with
//!    awareness of JSON string literals so braces inside strings are ignored

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract the first JSON object found in `text`.
pub fn extract_json_object(text: &str) -> Option<Value> {
    fenced_blocks(text)
        .into_iter()
        .find_map(|block| parse_object(block))
        .or_else(|| parse_object(text))
        .or_else(|| balanced_objects(text).find_map(parse_object))
}

/// Extract and deserialize a payload of type `T`.
///
/// Candidates are tried in the same order as [`extract_json_object`]; the
/// first that deserializes into `T` wins.
pub fn extract_payload<T: DeserializeOwned>(text: &str) -> Option<T> {
    let from_value = |v: Value| serde_json::from_value::<T>(v).ok();

    fenced_blocks(text)
        .into_iter()
        .filter_map(parse_object)
        .find_map(from_value)
        .or_else(|| parse_object(text).and_then(from_value))
        .or_else(|| {
            balanced_objects(text)
                .filter_map(parse_object)
                .find_map(from_value)
        })
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Bodies of fenced code blocks, in order of appearance.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        // Skip the info string (e.g. "json") up to the end of the line
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(after_fence.len());
        let body = &after_fence[body_start..];
        match body.find("```") {
            Some(close) => {
                blocks.push(&body[..close]);
                rest = &body[close + 3..];
            }
            None => break,
        }
    }
    blocks
}

/// Every balanced `{...}` span, starting from each opening brace in turn.
fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .filter_map(move |(start, _)| balanced_span(&text[start..]))
}

fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pick {
        best_plan_name: String,
    }

    #[test]
    fn test_fenced_json_block() {
        let text = "Here you go:\n```json\n{\"best_plan_name\": \"Deep Dive\"}\n```\nThanks";
        let pick: Pick = extract_payload(text).unwrap();
        assert_eq!(pick.best_plan_name, "Deep Dive");
    }

    #[test]
    fn test_bare_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(text).unwrap()["a"], 1);
    }

    #[test]
    fn test_unwrapped_payload() {
        let value = extract_json_object("  {\"plans\": []}  ").unwrap();
        assert!(value["plans"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_object_inside_prose() {
        let text = "Thinking... the answer is {\"thought\": \"ok\", \"confidence_score\": 0.8} done.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["thought"], "ok");
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"prefix {"thought": "use {x} and \"}\" carefully", "n": 2} suffix"#;
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["n"], 2);
        assert_eq!(value["thought"], "use {x} and \"}\" carefully");
    }

    #[test]
    fn test_skips_unparseable_span() {
        let text = "set {a, b} then {\"ok\": true}";
        assert_eq!(extract_json_object(text).unwrap()["ok"], true);
    }

    #[test]
    fn test_payload_type_mismatch_moves_on() {
        let text = "{\"other\": 1} and {\"best_plan_name\": \"B\"}";
        let pick: Pick = extract_payload(text).unwrap();
        assert_eq!(pick.best_plan_name, "B");
    }

    #[test]
    fn test_no_object() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("{unterminated").is_none());
        assert!(extract_json_object("").is_none());
    }
}
