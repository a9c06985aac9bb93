//! Deterministic fallback synthesis and the low-information merge.

use crate::debate::RoundRecord;

use super::confidence::heuristic_confidence;
use super::normalize::{is_placeholder, NO_CONSENSUS, NO_SUMMARY};
use super::{RoundResponses, SynthesisConfig, SynthesisResult};

const FALLBACK_AGREEMENTS: [&str; 2] = [
    "All agents provided a structured argument with cited support.",
    "All agents addressed implementation tradeoffs and second-order effects.",
];

const FALLBACK_DISAGREEMENTS: [&str; 2] = [
    "Agents still differ on the level and design of intervention.",
    "Evidence weighting still differs across ideology-specific priorities.",
];

const FALLBACK_CONSENSUS: &str = "A provisional consensus favors targeted, evidence-led policy \
with explicit guardrails, while major disagreement remains on subsidy scale and state-market boundary.";

const FALLBACK_SUMMARY: &str = "The round shows convergence on goals and evaluation criteria, \
but unresolved disagreement on policy intensity and implementation design keeps confidence moderate.";

/// Characters of each role text quoted in a strongest-argument excerpt.
const EXCERPT_CHARS: usize = 180;

/// Largest upward move of the fallback confidence from its anchor.
const MAX_FALLBACK_RISE: f64 = 6.0;

/// A fallback result plus the confidence it was anchored to.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    pub result: SynthesisResult,
    /// Previous round's confidence, or the configured round-1 anchor.
    pub anchor_confidence: f64,
}

fn excerpt(label: &str, text: &str) -> String {
    let head: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{} focus: {}...", label, head.trim())
}

/// Build the fallback from the round's texts and prior history.
///
/// Needs no generator call, so it is always available.
pub fn deterministic_fallback(
    responses: &RoundResponses,
    history: &[RoundRecord],
    config: &SynthesisConfig,
) -> Fallback {
    let previous = history.last().map(|r| r.confidence);
    let anchor = previous.unwrap_or(config.anchor_confidence);

    let heuristic = heuristic_confidence(
        [
            responses.centre_left.as_str(),
            responses.centre.as_str(),
            responses.centre_right.as_str(),
        ],
        previous,
    );
    let lower = (anchor - config.max_confidence_step).max(0.0);
    let upper = (anchor + MAX_FALLBACK_RISE).min(100.0);
    let confidence = heuristic.min(upper).max(lower);

    let result = SynthesisResult {
        agreements: FALLBACK_AGREEMENTS.iter().map(|s| s.to_string()).collect(),
        disagreements: FALLBACK_DISAGREEMENTS.iter().map(|s| s.to_string()).collect(),
        strongest_arguments: responses
            .labelled()
            .iter()
            .map(|(label, text)| excerpt(label, text))
            .collect(),
        consensus_statement: FALLBACK_CONSENSUS.to_string(),
        confidence,
        summary: FALLBACK_SUMMARY.to_string(),
    };

    Fallback {
        result,
        anchor_confidence: anchor,
    }
}

/// Fill the gaps of a low-information result from the fallback.
///
/// Non-empty lists and non-placeholder texts are kept. A confidence of 0
/// or less takes the fallback's value; anything else is held within
/// `max_step` of the anchor.
pub fn merge_with_fallback(
    parsed: SynthesisResult,
    fallback: &Fallback,
    max_step: f64,
) -> SynthesisResult {
    let spare = &fallback.result;
    let pick_list = |own: Vec<String>, theirs: &Vec<String>| {
        if own.is_empty() {
            theirs.clone()
        } else {
            own
        }
    };
    let pick_text = |own: String, theirs: &str, placeholder: &str| {
        if is_placeholder(&own, placeholder) {
            theirs.to_string()
        } else {
            own
        }
    };

    let confidence = if parsed.confidence <= 0.0 {
        spare.confidence
    } else {
        let lower = (fallback.anchor_confidence - max_step).max(0.0);
        let upper = (fallback.anchor_confidence + max_step).min(100.0);
        parsed.confidence.clamp(lower, upper)
    };

    SynthesisResult {
        agreements: pick_list(parsed.agreements, &spare.agreements),
        disagreements: pick_list(parsed.disagreements, &spare.disagreements),
        strongest_arguments: pick_list(parsed.strongest_arguments, &spare.strongest_arguments),
        consensus_statement: pick_text(
            parsed.consensus_statement,
            &spare.consensus_statement,
            NO_CONSENSUS,
        ),
        confidence,
        summary: pick_text(parsed.summary, &spare.summary, NO_SUMMARY),
    }
}
