//! Deterministic stand-in used when no backend credential is configured.

use async_trait::async_trait;
use serde_json::json;

use super::{ChatMessage, GenerationOptions, GenerationPort, GenerationResult};

/// Markers that identify a request for a structured synthesis payload.
const STRUCTURED_MARKERS: [&str; 2] = ["\"confidence\"", "\"consensus_statement\""];

/// Confidence reported by the structured stand-in payload.
pub const STAND_IN_CONFIDENCE: f64 = 62.0;

/// Local generator returning fixed text, never touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandInGenerator;

impl StandInGenerator {
    /// Whether `messages` ask for the structured synthesis schema.
    pub fn wants_structured(messages: &[ChatMessage]) -> bool {
        STRUCTURED_MARKERS
            .iter()
            .all(|marker| messages.iter().any(|m| m.content.contains(marker)))
    }

    fn structured_payload() -> String {
        json!({
            "agreements": [
                "All agents agree the decision should be evidence-based.",
                "All agents acknowledge implementation tradeoffs."
            ],
            "disagreements": [
                "The extent of market intervention remains contested.",
                "The timeline for policy impact is debated."
            ],
            "strongest_arguments": [
                "Balancing efficiency with social resilience lowers systemic risk.",
                "Policy sequencing is critical to avoid unintended consequences."
            ],
            "consensus_statement": "A phased, evidence-led approach with measurable safeguards is preferred.",
            "confidence": STAND_IN_CONFIDENCE,
            "summary": "Preliminary convergence exists, but unresolved scope differences reduce confidence."
        })
        .to_string()
    }

    fn prose() -> String {
        concat!(
            "This is a fallback response because OPENAI_API_KEY is not configured.\n\n",
            "The argument supports a measured path with explicit tradeoff analysis and cites\n",
            "policy precedent, economic theory, and historical analogs to justify recommendations.\n\n",
            "Counterpoint: a competing stance overweights one objective and underestimates second-order effects.\n\n",
            "References: post-2008 macroprudential reforms; welfare economics; comparative OECD outcomes."
        )
        .to_string()
    }
}

#[async_trait]
impl GenerationPort for StandInGenerator {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        _options: GenerationOptions,
    ) -> GenerationResult<String> {
        if Self::wants_structured(messages) {
            Ok(Self::structured_payload())
        } else {
            Ok(Self::prose())
        }
    }
}
