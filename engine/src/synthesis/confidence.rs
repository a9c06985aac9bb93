//! Heuristic convergence score from lexical overlap between role texts.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]{4,}").expect("word regex must compile"));

const STOP_WORDS: &[&str] = &[
    "that", "this", "with", "from", "have", "will", "they", "their", "which", "about", "there",
    "should", "would", "could", "while", "where", "into", "because", "against",
];

const BASE_CONFIDENCE: f64 = 30.0;
const OVERLAP_WEIGHT: f64 = 55.0;
const STABILITY_WINDOW: f64 = 8.0;
const STABILITY_BONUS: f64 = 3.0;
const COLLAPSE_DRIFT: f64 = -15.0;
const COLLAPSE_BONUS: f64 = 5.0;
const MIN_HEURISTIC: f64 = 25.0;
const MAX_HEURISTIC: f64 = 88.0;

/// Lowercased alphabetic words of length ≥ 4, minus stop words.
pub fn token_set(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Intersection over union; 0 when either set is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Convergence estimate for three role texts.
///
/// `30 + avg_overlap * 55`, plus a stability bonus when close to the
/// previous round or an anti-collapse bonus after a sharp drop, rounded to
/// one decimal and clamped to `[25, 88]`.
pub fn heuristic_confidence(texts: [&str; 3], previous: Option<f64>) -> f64 {
    let [left, centre, right] = texts.map(token_set);
    let avg_overlap =
        (jaccard(&left, &centre) + jaccard(&centre, &right) + jaccard(&left, &right)) / 3.0;

    let mut confidence = BASE_CONFIDENCE + avg_overlap * OVERLAP_WEIGHT;
    if let Some(previous) = previous {
        let drift = confidence - previous;
        if drift.abs() <= STABILITY_WINDOW {
            confidence += STABILITY_BONUS;
        } else if drift < COLLAPSE_DRIFT {
            confidence += COLLAPSE_BONUS;
        }
    }

    round_one_decimal(confidence).clamp(MIN_HEURISTIC, MAX_HEURISTIC)
}
