//! Responder roles — the three ideologically framed debate participants.
//!
//! Each role builds a fixed system instruction plus a rendering of recent
//! history, then asks the generation port for free text at its own fixed
//! temperature. Failures are not retried here; the orchestrator turns them
//! into an error event.

pub mod memory;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::debate::RoundRecord;
use crate::generation::{
    ChatMessage, GenerationOptions, GenerationResult, SharedGenerationPort,
};

pub use memory::{clip, render_responder_memory};

/// One of the three responder roles. Declaration order is speaking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderRole {
    CentreLeft,
    Centre,
    CentreRight,
}

impl ResponderRole {
    /// All roles in speaking order.
    pub const ALL: [ResponderRole; 3] = [Self::CentreLeft, Self::Centre, Self::CentreRight];

    /// Human-readable label used in prompts and messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::CentreLeft => "Centre-Left",
            Self::Centre => "Centre",
            Self::CentreRight => "Centre-Right",
        }
    }

    /// Sampling temperature, fixed per role.
    pub fn temperature(self) -> f32 {
        match self {
            Self::CentreLeft => 0.6,
            Self::Centre => 0.45,
            Self::CentreRight => 0.55,
        }
    }

    /// Ideological tendencies the role argues from.
    pub fn tendencies(self) -> [&'static str; 3] {
        match self {
            Self::CentreLeft => [
                "Social equity focus",
                "Regulated capitalism",
                "Long-term societal welfare",
            ],
            Self::Centre => [
                "Analytical neutrality",
                "Tradeoff-based reasoning",
                "Evidence-driven reasoning",
            ],
            Self::CentreRight => [
                "Market efficiency",
                "Institutional stability",
                "Individual responsibility",
            ],
        }
    }

    /// System instruction: framing plus structural requirements.
    pub fn system_prompt(self) -> String {
        let tendencies = self
            .tendencies()
            .iter()
            .map(|t| format!("- {}", t))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "You are the {} Agent in a structured multi-agent debate.\n\
             Ideological tendencies:\n{}\n\n\
             Requirements:\n\
             - Respond in exactly 3 or 4 concise paragraphs.\n\
             - Keep total length under 220 words.\n\
             - Use prior debate memory to maintain coherence.\n\
             - Counter at least one argument from another agent explicitly.\n\
             - Keep ideological consistency.\n\
             - Cite support using policy precedent, economic theory, historical example, or research insight.\n\
             - End with a short line 'Citations:' followed by semicolon-separated references.",
            self.label(),
            tendencies
        )
    }

    /// User message: the prompt, the round, and rendered memory.
    pub fn user_prompt(self, prompt: &str, history: &[RoundRecord], round_number: u32) -> String {
        format!(
            "Debate prompt: {}\nRound: {}\n\nDebate memory:\n{}\n\nNow produce the {} response.",
            prompt,
            round_number,
            render_responder_memory(history),
            self.label()
        )
    }
}

impl std::fmt::Display for ResponderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CentreLeft => write!(f, "centre_left"),
            Self::Centre => write!(f, "centre"),
            Self::CentreRight => write!(f, "centre_right"),
        }
    }
}

/// A responder bound to a generation port.
#[derive(Clone)]
pub struct Responder {
    role: ResponderRole,
    port: SharedGenerationPort,
}

impl Responder {
    pub fn new(role: ResponderRole, port: SharedGenerationPort) -> Self {
        Self { role, port }
    }

    pub fn role(&self) -> ResponderRole {
        self.role
    }

    /// Produce this role's text for a round.
    pub async fn respond(
        &self,
        prompt: &str,
        history: &[RoundRecord],
        round_number: u32,
    ) -> GenerationResult<String> {
        let messages = vec![
            ChatMessage::system(self.role.system_prompt()),
            ChatMessage::user(self.role.user_prompt(prompt, history, round_number)),
        ];
        debug!(role = %self.role, round = round_number, history = history.len(), "Responder turn");
        self.port
            .generate(&messages, GenerationOptions::text(self.role.temperature()))
            .await
    }
}
