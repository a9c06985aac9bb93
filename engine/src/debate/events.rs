//! Debate events — one per observable phase transition.
//!
//! Each variant carries only the fields relevant to its tag. Serialized
//! with an internal `event_type` tag so a transport can forward each event
//! as one flat JSON object.

use serde::{Deserialize, Serialize};

use super::state::RoundRecord;
use crate::roles::ResponderRole;
use crate::synthesis::SynthesisResult;

/// Participant named by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    CentreLeft,
    Centre,
    CentreRight,
    Moderator,
}

impl From<ResponderRole> for Speaker {
    fn from(role: ResponderRole) -> Self {
        match role {
            ResponderRole::CentreLeft => Self::CentreLeft,
            ResponderRole::Centre => Self::Centre,
            ResponderRole::CentreRight => Self::CentreRight,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CentreLeft => write!(f, "centre_left"),
            Self::Centre => write!(f, "centre"),
            Self::CentreRight => write!(f, "centre_right"),
            Self::Moderator => write!(f, "moderator"),
        }
    }
}

/// All events produced by a debate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum DebateEvent {
    /// Debate accepted and about to run.
    Started {
        target_confidence: f64,
        message: String,
    },

    /// A new round began.
    RoundStart { round_number: u32, message: String },

    /// A responder was asked for its turn.
    AgentThinking {
        round_number: u32,
        agent: Speaker,
        message: String,
    },

    /// A responder produced its text.
    AgentResponse {
        round_number: u32,
        agent: Speaker,
        content: String,
    },

    /// The moderator began synthesizing the round.
    ModeratorThinking {
        round_number: u32,
        agent: Speaker,
        message: String,
    },

    /// The moderator produced its synthesis.
    ModeratorResponse {
        round_number: u32,
        agent: Speaker,
        moderator: SynthesisResult,
        message: String,
    },

    /// The round was recorded in history.
    Round {
        round_number: u32,
        round_data: RoundRecord,
        moderator: SynthesisResult,
    },

    /// The debate ended normally.
    Final {
        final_consensus: String,
        final_confidence: f64,
        rounds_completed: u32,
        message: String,
    },

    /// The debate ended early because of a failure.
    Error { message: String },
}

impl DebateEvent {
    pub fn started(target_confidence: f64) -> Self {
        Self::Started {
            target_confidence,
            message: "Debate started".to_string(),
        }
    }

    pub fn round_start(round_number: u32) -> Self {
        Self::RoundStart {
            round_number,
            message: format!("Debate Round {} started", round_number),
        }
    }

    pub fn agent_thinking(round_number: u32, role: ResponderRole) -> Self {
        Self::AgentThinking {
            round_number,
            agent: role.into(),
            message: format!("{} agent is thinking...", role.label()),
        }
    }

    pub fn agent_response(round_number: u32, role: ResponderRole, content: String) -> Self {
        Self::AgentResponse {
            round_number,
            agent: role.into(),
            content,
        }
    }

    pub fn moderator_thinking(round_number: u32) -> Self {
        Self::ModeratorThinking {
            round_number,
            agent: Speaker::Moderator,
            message: "Moderator is synthesizing the round...".to_string(),
        }
    }

    pub fn moderator_response(round_number: u32, moderator: SynthesisResult) -> Self {
        let message = format!("Moderator confidence: {:.1}%", moderator.confidence);
        Self::ModeratorResponse {
            round_number,
            agent: Speaker::Moderator,
            moderator,
            message,
        }
    }

    pub fn round(round_data: RoundRecord, moderator: SynthesisResult) -> Self {
        Self::Round {
            round_number: round_data.round_number,
            round_data,
            moderator,
        }
    }

    pub fn final_event(final_consensus: String, final_confidence: f64, rounds_completed: u32) -> Self {
        Self::Final {
            final_consensus,
            final_confidence,
            rounds_completed,
            message: "Debate completed".to_string(),
        }
    }

    pub fn error(cause: impl std::fmt::Display) -> Self {
        Self::Error {
            message: format!("Debate failed: {}", cause),
        }
    }

    /// Wire name of the event tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::RoundStart { .. } => "round_start",
            Self::AgentThinking { .. } => "agent_thinking",
            Self::AgentResponse { .. } => "agent_response",
            Self::ModeratorThinking { .. } => "moderator_thinking",
            Self::ModeratorResponse { .. } => "moderator_response",
            Self::Round { .. } => "round",
            Self::Final { .. } => "final",
            Self::Error { .. } => "error",
        }
    }

    /// Round number, for round-scoped events.
    pub fn round_number(&self) -> Option<u32> {
        match self {
            Self::RoundStart { round_number, .. }
            | Self::AgentThinking { round_number, .. }
            | Self::AgentResponse { round_number, .. }
            | Self::ModeratorThinking { round_number, .. }
            | Self::ModeratorResponse { round_number, .. }
            | Self::Round { round_number, .. } => Some(*round_number),
            _ => None,
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Final { .. } | Self::Error { .. })
    }
}
