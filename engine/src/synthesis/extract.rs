//! Tolerant extraction of a JSON object from generator output.
//!
//! Tries, in order: the whole text, the body of a fenced code block, and
//! the first balanced `{...}` found by a quote-aware brace scanner.

use serde_json::Value;
use thiserror::Error;

/// Why no JSON object could be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("empty moderator output")]
    Empty,

    #[error("no JSON object start found")]
    NoObject,

    #[error("no balanced JSON object found")]
    Unbalanced,

    #[error("balanced object is not valid JSON: {0}")]
    Invalid(String),
}

/// Recover the first JSON value from `raw`.
pub fn extract_json_object(raw: &str) -> Result<Value, ExtractError> {
    let mut text = raw.trim();
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }

    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    let unfenced: String;
    if let Some(body) = strip_fence(text) {
        if let Ok(value) = serde_json::from_str(&body) {
            return Ok(value);
        }
        unfenced = body;
        text = unfenced.as_str();
    }

    let candidate = first_balanced_object(text)?;
    serde_json::from_str(candidate).map_err(|e| ExtractError::Invalid(e.to_string()))
}

/// Body of a ```` ``` ```` fenced block, without an optional `json` label.
///
/// Requires at least three lines and a closing fence on the last line.
fn strip_fence(text: &str) -> Option<String> {
    if !text.starts_with("```") {
        return None;
    }
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 3 || lines[lines.len() - 1].trim() != "```" {
        return None;
    }
    let body = lines[1..lines.len() - 1].join("\n");
    let body = body.trim();
    let body = match body.get(..4) {
        Some(label) if label.eq_ignore_ascii_case("json") => body[4..].trim(),
        _ => body,
    };
    Some(body.to_string())
}

/// Slice of the first balanced `{...}` in `text`.
///
/// Single pass with a depth counter and an in-string/escape flag pair, so
/// braces inside string literals and escaped quotes do not count.
fn first_balanced_object(text: &str) -> Result<&str, ExtractError> {
    let start = text.find('{').ok_or(ExtractError::NoObject)?;

    let mut depth: u32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(ExtractError::Unbalanced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse() {
        let value = extract_json_object(r#"  {"confidence": 55}  "#).unwrap();
        assert_eq!(value, json!({"confidence": 55}));
    }

    #[test]
    fn test_fenced_json_matches_unwrapped() {
        let plain = r#"{"agreements": ["a"], "confidence": 40}"#;
        let fenced = format!("```json\n{}\n```", plain);
        assert_eq!(
            extract_json_object(&fenced).unwrap(),
            extract_json_object(plain).unwrap()
        );
    }

    #[test]
    fn test_fence_without_label() {
        let fenced = "```\n{\"summary\": \"ok\"}\n```";
        assert_eq!(extract_json_object(fenced).unwrap(), json!({"summary": "ok"}));
    }

    #[test]
    fn test_fence_with_label_on_own_line() {
        let fenced = "```\njson\n{\"summary\": \"ok\"}\n```";
        assert_eq!(extract_json_object(fenced).unwrap(), json!({"summary": "ok"}));
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let raw = "Here is the result: {\"confidence\": 70, \"summary\": \"s\"} Hope it helps.";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value["confidence"], 70);
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let raw = r#"Result: {"summary": "use {braces} and }", "confidence": 1} trailing }"#;
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value["summary"], "use {braces} and }");
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let raw = r#"note {"summary": "she said \"}\" loudly", "confidence": 2} end"#;
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value["summary"], "she said \"}\" loudly");
        assert_eq!(value["confidence"], 2);
    }

    #[test]
    fn test_nested_objects() {
        let raw = r#"x {"a": {"b": {"c": 1}}, "d": 2} y {"e": 3}"#;
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value, json!({"a": {"b": {"c": 1}}, "d": 2}));
    }

    #[test]
    fn test_fence_with_prose_falls_through_to_scan() {
        let raw = "```json\nSure! {\"summary\": \"x\"}\n```";
        assert_eq!(extract_json_object(raw).unwrap(), json!({"summary": "x"}));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_json_object("   \n"), Err(ExtractError::Empty));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(
            extract_json_object("The agents broadly agree."),
            Err(ExtractError::NoObject)
        );
    }

    #[test]
    fn test_unbalanced_object() {
        assert_eq!(
            extract_json_object(r#"text {"summary": "never closed""#),
            Err(ExtractError::Unbalanced)
        );
    }

    #[test]
    fn test_balanced_but_invalid() {
        let err = extract_json_object("prefix {not: json} suffix").unwrap_err();
        assert!(matches!(err, ExtractError::Invalid(_)));
    }

    #[test]
    fn test_multibyte_text_before_object() {
        let raw = "Résumé — voilà: {\"summary\": \"ünïcode\"}";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value["summary"], "ünïcode");
    }
}
