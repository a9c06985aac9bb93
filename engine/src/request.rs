//! Start request and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PROMPT_CHARS: usize = 5;
pub const MAX_PROMPT_CHARS: usize = 3000;
pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 20;
pub const DEFAULT_MAX_ROUNDS: u32 = 8;

/// Why a start request was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("prompt must be 5-3000 characters, got {len}")]
    PromptLength { len: usize },

    #[error("confidence_target must be within 0-100, got {0}")]
    ConfidenceTarget(f64),

    #[error("max_rounds must be within 1-20, got {0}")]
    MaxRounds(u32),
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

/// A request to run one debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRequest {
    pub prompt: String,
    /// Confidence (0–100) at which the debate stops early.
    pub confidence_target: f64,
    /// Round cap (1–20).
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

impl DebateRequest {
    pub fn new(prompt: impl Into<String>, confidence_target: f64, max_rounds: u32) -> Self {
        Self {
            prompt: prompt.into(),
            confidence_target,
            max_rounds,
        }
    }

    /// Check the request before it reaches the orchestrator.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }
        let len = self.prompt.chars().count();
        if !(MIN_PROMPT_CHARS..=MAX_PROMPT_CHARS).contains(&len) {
            return Err(RequestError::PromptLength { len });
        }
        if !(0.0..=100.0).contains(&self.confidence_target) {
            return Err(RequestError::ConfidenceTarget(self.confidence_target));
        }
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.max_rounds) {
            return Err(RequestError::MaxRounds(self.max_rounds));
        }
        Ok(())
    }
}
