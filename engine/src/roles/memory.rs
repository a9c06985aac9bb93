//! Rendering of prior rounds into responder prompts.

use crate::debate::RoundRecord;

/// Most recent rounds shown to a responder.
pub const RESPONDER_MEMORY_ROUNDS: usize = 3;
/// Clip length for each responder text in memory.
pub const RESPONSE_CLIP: usize = 320;
/// Clip length for moderator summary and consensus in memory.
pub const MODERATOR_CLIP: usize = 220;

/// Text used when no round has completed yet.
pub const NO_PRIOR_ROUNDS: &str = "No prior rounds.";

/// Collapse whitespace and truncate to `limit` characters.
///
/// Over-long text keeps `limit - 3` characters, loses trailing whitespace
/// and gains `...`, so the result never exceeds `limit`.
pub fn clip(text: &str, limit: usize) -> String {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.chars().count() <= limit {
        return clean;
    }
    let kept: String = clean.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Render the last few rounds for a responder prompt.
pub fn render_responder_memory(history: &[RoundRecord]) -> String {
    if history.is_empty() {
        return NO_PRIOR_ROUNDS.to_string();
    }
    let start = history.len().saturating_sub(RESPONDER_MEMORY_ROUNDS);
    history[start..]
        .iter()
        .map(|r| {
            format!(
                "Round {}:\n- Centre-Left: {}\n- Centre: {}\n- Centre-Right: {}\n- Moderator: {}\n- Consensus: {} (confidence: {:.1})",
                r.round_number,
                clip(&r.centre_left_response, RESPONSE_CLIP),
                clip(&r.centre_response, RESPONSE_CLIP),
                clip(&r.centre_right_response, RESPONSE_CLIP),
                clip(&r.moderator_summary, MODERATOR_CLIP),
                clip(&r.consensus_statement, MODERATOR_CLIP),
                r.confidence
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round: u32, text: &str) -> RoundRecord {
        RoundRecord {
            round_number: round,
            centre_left_response: text.to_string(),
            centre_response: text.to_string(),
            centre_right_response: text.to_string(),
            moderator_summary: text.to_string(),
            consensus_statement: text.to_string(),
            confidence: 50.0,
        }
    }

    #[test]
    fn test_clip_short_text_untouched() {
        assert_eq!(clip("short text", 20), "short text");
    }

    #[test]
    fn test_clip_collapses_whitespace() {
        assert_eq!(clip("  a\n\n b \t c  ", 20), "a b c");
    }

    #[test]
    fn test_clip_truncates_with_ellipsis() {
        let clipped = clip("abcdefghij", 8);
        assert_eq!(clipped, "abcde...");
        assert_eq!(clipped.chars().count(), 8);
    }

    #[test]
    fn test_clip_trims_before_ellipsis() {
        // "abcd efgh" → keep 5 chars "abcd " → trimmed "abcd"
        assert_eq!(clip("abcd efgh", 8), "abcd...");
    }

    #[test]
    fn test_clip_counts_chars_not_bytes() {
        let text = "é".repeat(10);
        let clipped = clip(&text, 6);
        assert_eq!(clipped, "ééé...");
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(render_responder_memory(&[]), NO_PRIOR_ROUNDS);
    }

    #[test]
    fn test_only_last_three_rounds() {
        let history: Vec<RoundRecord> = (1..=5).map(|n| record(n, "text")).collect();
        let rendered = render_responder_memory(&history);
        assert!(!rendered.contains("Round 1:"));
        assert!(!rendered.contains("Round 2:"));
        assert!(rendered.contains("Round 3:"));
        assert!(rendered.contains("Round 5:"));
    }

    #[test]
    fn test_fields_clipped_independently() {
        let long = "word ".repeat(200);
        let history = vec![record(1, &long)];
        let rendered = render_responder_memory(&history);
        let moderator_line = rendered
            .lines()
            .find(|l| l.starts_with("- Moderator: "))
            .unwrap();
        let summary = moderator_line.trim_start_matches("- Moderator: ");
        assert_eq!(summary.chars().count(), MODERATOR_CLIP);
        assert!(summary.ends_with("wo..."));
        let left_line = rendered
            .lines()
            .find(|l| l.starts_with("- Centre-Left: "))
            .unwrap();
        assert!(left_line.ends_with("..."));
        assert!(left_line.trim_start_matches("- Centre-Left: ").chars().count() <= RESPONSE_CLIP);
    }

    #[test]
    fn test_consensus_confidence_keeps_decimal() {
        let rendered = render_responder_memory(&[record(1, "text")]);
        assert!(rendered.ends_with("- Consensus: text (confidence: 50.0)"));
    }
}
