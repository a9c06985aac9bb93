//! The moderator cascade: primary, repair, regenerate, fallback.

use tracing::{debug, info, warn};

use crate::debate::RoundRecord;
use crate::generation::SharedGenerationPort;

use super::fallback::{deterministic_fallback, merge_with_fallback, Fallback};
use super::normalize::{
    is_low_information, is_parse_failure, is_placeholder, parse_synthesis, NO_CONSENSUS,
    NO_SUMMARY, PARSE_FAILURE_CONSENSUS,
};
use super::prompts;
use super::{CascadeStage, RoundResponses, SynthesisConfig, SynthesisResult};

/// A synthesis result plus the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutcome {
    pub result: SynthesisResult,
    pub stage: CascadeStage,
    /// Length of the primary raw text.
    pub raw_len: usize,
}

/// Turns three role texts into a [`SynthesisResult`]. Never fails.
pub struct SynthesisPipeline {
    port: SharedGenerationPort,
    config: SynthesisConfig,
}

impl SynthesisPipeline {
    pub fn new(port: SharedGenerationPort, config: SynthesisConfig) -> Self {
        Self { port, config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize a round.
    pub async fn synthesize(
        &self,
        prompt: &str,
        round_number: u32,
        responses: &RoundResponses,
        history: &[RoundRecord],
    ) -> SynthesisResult {
        self.synthesize_with_stage(prompt, round_number, responses, history)
            .await
            .result
    }

    /// Synthesize a round and report which cascade stage won.
    pub async fn synthesize_with_stage(
        &self,
        prompt: &str,
        round_number: u32,
        responses: &RoundResponses,
        history: &[RoundRecord],
    ) -> SynthesisOutcome {
        let memory = prompts::render_moderator_memory(history);

        let (raw, primary_failed) = match self
            .port
            .generate(
                &prompts::primary_messages(prompt, round_number, responses, &memory),
                prompts::primary_options(),
            )
            .await
        {
            Ok(text) => (text, false),
            Err(e) => {
                warn!(round = round_number, error = %e, "Primary synthesis call failed");
                (String::new(), true)
            }
        };

        let mut parsed = parse_synthesis(&raw);
        let mut stage = CascadeStage::Primary;

        if is_parse_failure(&parsed) && !primary_failed {
            let repaired = self.repair(&raw, round_number).await;
            parsed = parse_synthesis(&repaired);
            stage = CascadeStage::Repaired;
        }

        if !is_parse_failure(&parsed) && is_low_information(&parsed) {
            if let Some(better) = self
                .regenerate(prompt, round_number, responses, &memory)
                .await
            {
                parsed = better;
                stage = CascadeStage::Regenerated;
            }
        }

        let fallback = deterministic_fallback(responses, history, &self.config);

        let resolved = if is_parse_failure(&parsed) {
            stage = CascadeStage::FallbackParse;
            fallback.result.clone()
        } else if is_low_information(&parsed) {
            stage = CascadeStage::FallbackMerge;
            merge_with_fallback(parsed, &fallback, self.config.max_confidence_step)
        } else {
            parsed
        };

        let result = finalize(resolved, &fallback);

        debug!(
            round = round_number,
            stage = %stage,
            confidence = result.confidence,
            "Synthesis resolved"
        );
        if self.config.debug {
            info!(
                target: "moderator",
                round = round_number,
                stage = %stage,
                confidence = %format!("{:.1}", result.confidence),
                agreements = result.agreements.len(),
                disagreements = result.disagreements.len(),
                strongest = result.strongest_arguments.len(),
                raw_len = raw.len(),
                "Moderator stage"
            );
        }

        SynthesisOutcome {
            result,
            stage,
            raw_len: raw.len(),
        }
    }

    /// Ask for a zero-temperature repair; on failure keep the original text.
    async fn repair(&self, raw: &str, round_number: u32) -> String {
        match self
            .port
            .generate(&prompts::repair_messages(raw), prompts::repair_options())
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(round = round_number, error = %e, "Repair call failed, keeping raw text");
                raw.to_string()
            }
        }
    }

    /// Strict regeneration; `Some` only when the new result is informative.
    async fn regenerate(
        &self,
        prompt: &str,
        round_number: u32,
        responses: &RoundResponses,
        memory: &str,
    ) -> Option<SynthesisResult> {
        let text = match self
            .port
            .generate(
                &prompts::regeneration_messages(prompt, round_number, responses, memory),
                prompts::regeneration_options(),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(round = round_number, error = %e, "Regeneration call failed");
                return None;
            }
        };
        let candidate = parse_synthesis(&text);
        (!is_parse_failure(&candidate) && !is_low_information(&candidate)).then_some(candidate)
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Guarantee pass applied to every resolved result.
fn finalize(result: SynthesisResult, fallback: &Fallback) -> SynthesisResult {
    let spare = &fallback.result;
    let consensus = result.consensus_statement.trim();
    let consensus_statement =
        if is_placeholder(consensus, NO_CONSENSUS) || consensus == PARSE_FAILURE_CONSENSUS {
            spare.consensus_statement.clone()
        } else {
            consensus.to_string()
        };
    let summary = if is_placeholder(&result.summary, NO_SUMMARY) {
        spare.summary.clone()
    } else {
        result.summary.trim().to_string()
    };
    let confidence = if result.confidence.is_finite() {
        result.confidence.clamp(0.0, 100.0)
    } else {
        spare.confidence
    };

    SynthesisResult {
        agreements: clean_list(result.agreements),
        disagreements: clean_list(result.disagreements),
        strongest_arguments: clean_list(result.strongest_arguments),
        consensus_statement,
        confidence,
        summary,
    }
}
