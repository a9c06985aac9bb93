//! Normalization of parsed moderator payloads.
//!
//! Generators return list fields in many shapes. [`coerce_item`] maps
//! every JSON shape onto one plain string and never fails; only a payload
//! that is not an object, or a confidence that is not a number, makes the
//! whole parse fail.
//!
//! A null list entry carries no text and is dropped. A boolean confidence
//! counts as 1 or 0.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::extract::{extract_json_object, ExtractError};
use super::SynthesisResult;

/// Placeholder for an empty consensus statement.
pub const NO_CONSENSUS: &str = "No consensus available.";
/// Placeholder for an empty summary.
pub const NO_SUMMARY: &str = "No summary available.";
/// Consensus sentinel marking a parse failure.
pub const PARSE_FAILURE_CONSENSUS: &str = "Consensus unavailable due to parsing issue.";
/// Disagreement recorded on a parse failure.
pub const PARSE_FAILURE_DISAGREEMENT: &str = "Could not parse moderator output as JSON.";
/// Characters of raw text kept as the summary of a parse failure.
pub const PARSE_FAILURE_SUMMARY_CHARS: usize = 600;

/// Why a parsed value could not be normalized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("confidence is not a finite number: {0}")]
    Confidence(String),
}

/// Text form of a scalar (or any value nested below a list entry).
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Flatten one list entry into a single string.
///
/// Strings are trimmed; objects become `key: value` pairs joined by `"; "`;
/// nested lists become their scalars joined by `", "`; anything else takes
/// its JSON text form. Empty parts are skipped.
pub fn coerce_item(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| {
                let v = scalar_text(v);
                (!v.is_empty()).then(|| format!("{}: {}", k.trim(), v))
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    }
}

/// Coerce a list field; anything other than an array yields no entries.
fn normalize_items(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(coerce_item)
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Coerce the confidence field into a clamped float. Missing means 0.
fn normalize_confidence(value: Option<&Value>) -> Result<f64, NormalizeError> {
    let raw = match value {
        None => return Ok(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(_) => None,
    };
    match raw {
        Some(c) if c.is_finite() => Ok(c.clamp(0.0, 100.0)),
        _ => Err(NormalizeError::Confidence(
            value.map(Value::to_string).unwrap_or_default(),
        )),
    }
}

fn text_or(map: &Map<String, Value>, key: &str, placeholder: &str) -> String {
    let text = map.get(key).map(scalar_text).unwrap_or_default();
    if text.is_empty() {
        placeholder.to_string()
    } else {
        text
    }
}

/// Normalize a parsed payload into a [`SynthesisResult`].
pub fn normalize_payload(value: &Value) -> Result<SynthesisResult, NormalizeError> {
    let map = value.as_object().ok_or(NormalizeError::NotAnObject)?;
    Ok(SynthesisResult {
        agreements: normalize_items(map.get("agreements")),
        disagreements: normalize_items(map.get("disagreements")),
        strongest_arguments: normalize_items(map.get("strongest_arguments")),
        consensus_statement: text_or(map, "consensus_statement", NO_CONSENSUS),
        confidence: normalize_confidence(map.get("confidence"))?,
        summary: text_or(map, "summary", NO_SUMMARY),
    })
}

/// The deterministic result of an unparsable response.
pub fn parse_failure(raw: &str) -> SynthesisResult {
    SynthesisResult {
        agreements: Vec::new(),
        disagreements: vec![PARSE_FAILURE_DISAGREEMENT.to_string()],
        strongest_arguments: Vec::new(),
        consensus_statement: PARSE_FAILURE_CONSENSUS.to_string(),
        confidence: 0.0,
        summary: raw.chars().take(PARSE_FAILURE_SUMMARY_CHARS).collect(),
    }
}

/// Extract and normalize `raw`, or return the parse-failure result.
pub fn parse_synthesis(raw: &str) -> SynthesisResult {
    let parsed = extract_json_object(raw)
        .map_err(NormalizeError::from)
        .and_then(|value| normalize_payload(&value));
    match parsed {
        Ok(result) => result,
        Err(e) => {
            debug!(error = %e, raw_len = raw.len(), "Moderator output did not parse");
            parse_failure(raw)
        }
    }
}

/// Whether `result` is the parse-failure result.
pub fn is_parse_failure(result: &SynthesisResult) -> bool {
    result.consensus_statement == PARSE_FAILURE_CONSENSUS
}

/// Whether `text` is empty or a placeholder.
pub(crate) fn is_placeholder(text: &str, placeholder: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == placeholder
}

/// Structurally valid but content-poor: an empty list or placeholder text.
pub fn is_low_information(result: &SynthesisResult) -> bool {
    result.agreements.is_empty()
        || result.disagreements.is_empty()
        || result.strongest_arguments.is_empty()
        || is_placeholder(&result.summary, NO_SUMMARY)
        || is_placeholder(&result.consensus_statement, NO_CONSENSUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_payload() -> Value {
        json!({
            "agreements": ["a1", "a2"],
            "disagreements": ["d1"],
            "strongest_arguments": ["s1", "s2", "s3"],
            "consensus_statement": "Phase it in.",
            "confidence": 64.5,
            "summary": "Converging."
        })
    }

    #[test]
    fn test_coerce_string_trims() {
        assert_eq!(coerce_item(&json!("  spaced  ")), "spaced");
    }

    #[test]
    fn test_coerce_object_to_key_value_pairs() {
        let item = json!({"point": "Carbon pricing works", "source": "OECD", "note": ""});
        assert_eq!(coerce_item(&item), "point: Carbon pricing works; source: OECD");
    }

    #[test]
    fn test_coerce_nested_list() {
        assert_eq!(coerce_item(&json!(["a", 2, " ", true])), "a, 2, true");
    }

    #[test]
    fn test_coerce_other_scalars() {
        assert_eq!(coerce_item(&json!(42)), "42");
        assert_eq!(coerce_item(&json!(false)), "false");
        assert_eq!(coerce_item(&Value::Null), "");
    }

    #[test]
    fn test_list_of_mappings_flattened_in_order() {
        let payload = json!({
            "agreements": [
                {"topic": "pricing", "view": "shared"},
                {"topic": "timing", "view": "phased"}
            ],
            "confidence": 50
        });
        let result = normalize_payload(&payload).unwrap();
        assert_eq!(
            result.agreements,
            vec!["topic: pricing; view: shared", "topic: timing; view: phased"]
        );
    }

    #[test]
    fn test_empty_entries_dropped() {
        let payload = json!({"disagreements": ["", "  ", "real", {}, []]});
        let result = normalize_payload(&payload).unwrap();
        assert_eq!(result.disagreements, vec!["real"]);
    }

    #[test]
    fn test_non_list_field_becomes_empty() {
        let payload = json!({"agreements": "just a string", "confidence": 10});
        let result = normalize_payload(&payload).unwrap();
        assert!(result.agreements.is_empty());
    }

    #[test]
    fn test_confidence_clamped() {
        let high = normalize_payload(&json!({"confidence": 140})).unwrap();
        assert_eq!(high.confidence, 100.0);
        let low = normalize_payload(&json!({"confidence": -3})).unwrap();
        assert_eq!(low.confidence, 0.0);
        let text = normalize_payload(&json!({"confidence": " 71.5 "})).unwrap();
        assert_eq!(text.confidence, 71.5);
        let missing = normalize_payload(&json!({})).unwrap();
        assert_eq!(missing.confidence, 0.0);
    }

    #[test]
    fn test_bad_confidence_is_error() {
        let err = normalize_payload(&json!({"confidence": "high"})).unwrap_err();
        assert!(matches!(err, NormalizeError::Confidence(_)));
        assert!(normalize_payload(&json!({"confidence": null})).is_err());
        assert!(normalize_payload(&json!({"confidence": [70]})).is_err());
    }

    #[test]
    fn test_boolean_confidence_counts_as_one_or_zero() {
        let yes = normalize_payload(&json!({"confidence": true})).unwrap();
        assert_eq!(yes.confidence, 1.0);
        let no = normalize_payload(&json!({"confidence": false})).unwrap();
        assert_eq!(no.confidence, 0.0);
    }

    #[test]
    fn test_null_list_entries_dropped() {
        let result = normalize_payload(&json!({"agreements": [null, "Shared goal", null]})).unwrap();
        assert_eq!(result.agreements, vec!["Shared goal"]);
    }

    #[test]
    fn test_placeholders_for_empty_text() {
        let result = normalize_payload(&json!({"consensus_statement": "  ", "summary": null})).unwrap();
        assert_eq!(result.consensus_statement, NO_CONSENSUS);
        assert_eq!(result.summary, NO_SUMMARY);
        assert!(is_low_information(&result));
    }

    #[test]
    fn test_non_object_is_error() {
        assert_eq!(
            normalize_payload(&json!([1, 2])).unwrap_err(),
            NormalizeError::NotAnObject
        );
    }

    #[test]
    fn test_parse_synthesis_complete() {
        let raw = complete_payload().to_string();
        let result = parse_synthesis(&raw);
        assert!(!is_parse_failure(&result));
        assert!(!is_low_information(&result));
        assert_eq!(result.confidence, 64.5);
    }

    #[test]
    fn test_parse_synthesis_unparsable() {
        let raw = "The moderator could not decide.";
        let result = parse_synthesis(raw);
        assert!(is_parse_failure(&result));
        assert!(result.agreements.is_empty());
        assert!(result.strongest_arguments.is_empty());
        assert_eq!(result.disagreements, vec![PARSE_FAILURE_DISAGREEMENT]);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.summary, raw);
    }

    #[test]
    fn test_parse_failure_summary_truncated() {
        let raw = "x".repeat(1000);
        let result = parse_failure(&raw);
        assert_eq!(result.summary.len(), PARSE_FAILURE_SUMMARY_CHARS);
    }

    #[test]
    fn test_low_information_cases() {
        let full = normalize_payload(&complete_payload()).unwrap();
        assert!(!is_low_information(&full));

        let mut no_strongest = full.clone();
        no_strongest.strongest_arguments.clear();
        assert!(is_low_information(&no_strongest));

        let mut placeholder_summary = full.clone();
        placeholder_summary.summary = NO_SUMMARY.to_string();
        assert!(is_low_information(&placeholder_summary));

        let mut placeholder_consensus = full;
        placeholder_consensus.consensus_statement = NO_CONSENSUS.to_string();
        assert!(is_low_information(&placeholder_consensus));
    }
}
