//! Moderator prompt construction for the primary, repair and regeneration calls.

use crate::debate::RoundRecord;
use crate::generation::{ChatMessage, GenerationOptions};
use crate::roles::memory::NO_PRIOR_ROUNDS;

use super::RoundResponses;

/// Most recent rounds shown to the moderator.
pub const MODERATOR_MEMORY_ROUNDS: usize = 5;

/// Shape every moderator reply must follow.
pub const SCHEMA_SKELETON: &str = r#"{"agreements": ["..."], "disagreements": ["..."], "strongest_arguments": ["..."], "consensus_statement": "...", "confidence": 0, "summary": "..."}"#;

pub fn primary_options() -> GenerationOptions {
    GenerationOptions::json(0.25, 800)
}

pub fn repair_options() -> GenerationOptions {
    GenerationOptions::json(0.0, 500)
}

pub fn regeneration_options() -> GenerationOptions {
    GenerationOptions::json(0.15, 700)
}

/// Render the last few rounds for the moderator, unclipped.
pub fn render_moderator_memory(history: &[RoundRecord]) -> String {
    if history.is_empty() {
        return NO_PRIOR_ROUNDS.to_string();
    }
    let start = history.len().saturating_sub(MODERATOR_MEMORY_ROUNDS);
    history[start..]
        .iter()
        .map(|r| {
            format!(
                "Round {}:\n- Moderator summary: {}\n- Consensus: {}\n- Confidence: {:.1}",
                r.round_number, r.moderator_summary, r.consensus_statement, r.confidence
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn round_inputs(responses: &RoundResponses) -> String {
    responses
        .labelled()
        .iter()
        .map(|(label, text)| format!("{}:\n{}", label, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn primary_messages(
    prompt: &str,
    round_number: u32,
    responses: &RoundResponses,
    memory: &str,
) -> Vec<ChatMessage> {
    let system = format!(
        "You are the Moderator Agent in a structured debate.\n\
         Task:\n\
         - Identify agreements, disagreements, strongest arguments.\n\
         - Produce a consensus statement.\n\
         - Produce confidence score (0-100), reflecting logical convergence, evidence quality, and viewpoint stability.\n\
         - Be strict: confidence should increase only when disagreements materially narrow.\n\
         Return valid JSON only, shaped like:\n{}\n\
         For agreements, disagreements, and strongest_arguments return arrays of plain strings only.",
        SCHEMA_SKELETON
    );
    let user = format!(
        "Debate prompt: {}\nRound: {}\n\nPrior memory:\n{}\n\nCurrent round inputs:\n{}\n",
        prompt,
        round_number,
        memory,
        round_inputs(responses)
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn repair_messages(raw: &str) -> Vec<ChatMessage> {
    let system = format!(
        "You are a strict JSON repair assistant. Return valid JSON only, shaped like:\n{}\n\
         All list fields must be arrays of plain strings. confidence must be a number 0-100.",
        SCHEMA_SKELETON
    );
    let user = format!(
        "Repair this into valid JSON with the required schema:\n\n{}",
        raw
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn regeneration_messages(
    prompt: &str,
    round_number: u32,
    responses: &RoundResponses,
    memory: &str,
) -> Vec<ChatMessage> {
    let system = format!(
        "You are the moderator for a debate. Return JSON only, shaped like:\n{}\n\
         Rules:\n\
         - agreements: exactly 2 non-empty strings.\n\
         - disagreements: exactly 2 non-empty strings.\n\
         - strongest_arguments: exactly 3 non-empty strings (one per agent).\n\
         - consensus_statement: one concise paragraph.\n\
         - summary: one concise paragraph.\n\
         - confidence: number between 0 and 100.\n\
         No markdown, no code fences.",
        SCHEMA_SKELETON
    );
    let user = format!(
        "Prompt: {}\nRound: {}\nMemory:\n{}\n\n{}\n",
        prompt,
        round_number,
        memory,
        round_inputs(responses)
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}
