//! Moderator synthesis — recovering a structured verdict from free text.
//!
//! The moderator's generator is asked for strict JSON but is not trusted
//! to deliver it. The pipeline runs an ordered cascade and always returns
//! a valid [`SynthesisResult`]:
//!
//! ```text
//! primary ──parse ok──► low-information? ──no──────────────► done
//!    │                        │ yes
//!    │ parse failure          ▼
//!    ▼                   regenerate (strict counts)
//! repair ──parse ok──►        │ still low-info / failed
//!    │ parse failure          ▼
//!    ▼                   merge with deterministic fallback
//! deterministic fallback
//! ```
//!
//! Generator failures inside repair and regeneration count as "no
//! improvement" and never escape the pipeline.

pub mod confidence;
pub mod extract;
pub mod fallback;
pub mod normalize;
pub mod pipeline;
pub mod prompts;

use serde::{Deserialize, Serialize};

pub use confidence::{heuristic_confidence, jaccard, token_set};
pub use extract::{extract_json_object, ExtractError};
pub use fallback::{deterministic_fallback, merge_with_fallback, Fallback};
pub use normalize::{
    coerce_item, is_low_information, is_parse_failure, normalize_payload, parse_synthesis,
    NormalizeError,
};
pub use pipeline::{SynthesisOutcome, SynthesisPipeline};

/// Structured distillation of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Points all roles share.
    pub agreements: Vec<String>,
    /// Points still in dispute.
    pub disagreements: Vec<String>,
    /// Most persuasive arguments of the round.
    pub strongest_arguments: Vec<String>,
    pub consensus_statement: String,
    /// Convergence estimate, always within 0–100.
    pub confidence: f64,
    pub summary: String,
}

/// The three role texts of one round, in speaking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResponses {
    pub centre_left: String,
    pub centre: String,
    pub centre_right: String,
}

impl RoundResponses {
    pub fn new(
        centre_left: impl Into<String>,
        centre: impl Into<String>,
        centre_right: impl Into<String>,
    ) -> Self {
        Self {
            centre_left: centre_left.into(),
            centre: centre.into(),
            centre_right: centre_right.into(),
        }
    }

    /// Texts paired with their role labels, in speaking order.
    pub fn labelled(&self) -> [(&'static str, &str); 3] {
        [
            ("Centre-Left", self.centre_left.as_str()),
            ("Centre", self.centre.as_str()),
            ("Centre-Right", self.centre_right.as_str()),
        ]
    }
}

/// Cascade stage that produced the returned result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStage {
    /// First generation parsed and was informative.
    Primary,
    /// The repair call ran (its output was used as the parse input).
    Repaired,
    /// The strict regeneration replaced a low-information result.
    Regenerated,
    /// Nothing parsed; the deterministic fallback was returned whole.
    FallbackParse,
    /// Parsed but low-information; gaps filled from the fallback.
    FallbackMerge,
}

impl std::fmt::Display for CascadeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Repaired => write!(f, "repaired"),
            Self::Regenerated => write!(f, "regenerated"),
            Self::FallbackParse => write!(f, "fallback_parse"),
            Self::FallbackMerge => write!(f, "fallback_merge"),
        }
    }
}

/// Synthesis pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Emit one diagnostic line per round naming the winning stage.
    pub debug: bool,
    /// Confidence anchor used when there is no previous round.
    pub anchor_confidence: f64,
    /// Largest confidence move allowed when merging with the fallback.
    pub max_confidence_step: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            debug: false,
            anchor_confidence: 45.0,
            max_confidence_step: 8.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(CascadeStage::Primary.to_string(), "primary");
        assert_eq!(CascadeStage::Repaired.to_string(), "repaired");
        assert_eq!(CascadeStage::Regenerated.to_string(), "regenerated");
        assert_eq!(CascadeStage::FallbackParse.to_string(), "fallback_parse");
        assert_eq!(CascadeStage::FallbackMerge.to_string(), "fallback_merge");
    }

    #[test]
    fn test_config_default() {
        let config = SynthesisConfig::default();
        assert!(!config.debug);
        assert_eq!(config.anchor_confidence, 45.0);
        assert_eq!(config.max_confidence_step, 8.0);
    }

    #[test]
    fn test_labelled_order() {
        let responses = RoundResponses::new("l", "c", "r");
        let labels: Vec<&str> = responses.labelled().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Centre-Left", "Centre", "Centre-Right"]);
    }
}
