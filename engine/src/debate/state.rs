//! Debate state machine — phases, transitions, and session tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of a debate session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    /// Session created but no round started.
    NotStarted,
    /// Responders (then the moderator) are producing the current round.
    RoundInProgress,
    /// Round recorded; deciding whether to continue.
    Evaluating,
    /// Target confidence or round cap reached.
    Finished,
    /// A responder or moderator call failed and the stream ended early.
    Aborted,
}

impl DebatePhase {
    /// Whether this is a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Aborted)
    }

    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> &'static [DebatePhase] {
        match self {
            Self::NotStarted => &[Self::RoundInProgress],
            Self::RoundInProgress => &[Self::Evaluating, Self::Aborted],
            Self::Evaluating => &[Self::RoundInProgress, Self::Finished],
            Self::Finished | Self::Aborted => &[],
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::RoundInProgress => write!(f, "round_in_progress"),
            Self::Evaluating => write!(f, "evaluating"),
            Self::Finished => write!(f, "finished"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Record of one completed round. Immutable once appended to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number (1-indexed).
    pub round_number: u32,
    pub centre_left_response: String,
    pub centre_response: String,
    pub centre_right_response: String,
    /// Moderator summary of the round.
    pub moderator_summary: String,
    /// Moderator consensus statement.
    pub consensus_statement: String,
    /// Moderator confidence, 0–100.
    pub confidence: f64,
}

/// A phase transition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateTransition {
    pub from: DebatePhase,
    pub to: DebatePhase,
    /// Round number at the time of the transition.
    pub round: u32,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// Error for invalid state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition {from} → {to}: {reason}")]
pub struct TransitionError {
    pub from: DebatePhase,
    pub to: DebatePhase,
    pub reason: String,
}

/// Why a round ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundVerdict {
    /// Confidence below target and rounds remain.
    Continue,
    /// Confidence met the target.
    TargetReached,
    /// Last permitted round completed without reaching the target.
    RoundCapReached,
}

impl RoundVerdict {
    pub fn should_stop(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

impl std::fmt::Display for RoundVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::TargetReached => write!(f, "target_reached"),
            Self::RoundCapReached => write!(f, "round_cap_reached"),
        }
    }
}

/// A debate session tracking phase and transitions.
///
/// Round records themselves live in the history store; the session only
/// knows where the debate is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSession {
    /// Unique session identifier (keys the history store).
    pub id: String,
    pub phase: DebatePhase,
    /// Current round number; 0 before the first round.
    pub current_round: u32,
    pub max_rounds: u32,
    /// Confidence at or above which the debate stops.
    pub confidence_target: f64,
    pub transitions: Vec<DebateTransition>,
    pub created_at: DateTime<Utc>,
}

impl DebateSession {
    /// Create a new debate session.
    pub fn new(id: &str, confidence_target: f64, max_rounds: u32) -> Self {
        Self {
            id: id.to_string(),
            phase: DebatePhase::NotStarted,
            current_round: 0,
            max_rounds,
            confidence_target,
            transitions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Transition to a new phase with a reason.
    pub fn transition(&mut self, to: DebatePhase, reason: &str) -> Result<(), TransitionError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
                reason: format!(
                    "not a valid transition (allowed: {:?})",
                    self.phase.valid_transitions()
                ),
            });
        }

        // Entering a round bumps the counter.
        if to == DebatePhase::RoundInProgress {
            self.current_round += 1;
        }

        self.transitions.push(DebateTransition {
            from: self.phase,
            to,
            round: self.current_round,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;

        Ok(())
    }

    /// Start the debate (NotStarted → RoundInProgress, round 1).
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.transition(DebatePhase::RoundInProgress, "debate started")
    }

    /// Decide the verdict for a round that produced `confidence`.
    pub fn evaluate(&self, confidence: f64) -> RoundVerdict {
        if confidence >= self.confidence_target {
            RoundVerdict::TargetReached
        } else if !self.has_rounds_remaining() {
            RoundVerdict::RoundCapReached
        } else {
            RoundVerdict::Continue
        }
    }

    /// Whether the debate has ended.
    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Whether more rounds are available after the current one.
    pub fn has_rounds_remaining(&self) -> bool {
        self.current_round < self.max_rounds
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] round {}/{} | target={:.1} | session={}",
            self.phase, self.current_round, self.max_rounds, self.confidence_target, self.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = DebateSession::new("s-001", 70.0, 5);
        assert_eq!(session.phase, DebatePhase::NotStarted);
        assert_eq!(session.current_round, 0);
        assert_eq!(session.max_rounds, 5);
        assert!(!session.is_complete());
    }

    #[test]
    fn test_start_enters_round_one() {
        let mut session = DebateSession::new("s-001", 70.0, 5);
        session.start().unwrap();
        assert_eq!(session.phase, DebatePhase::RoundInProgress);
        assert_eq!(session.current_round, 1);
    }

    #[test]
    fn test_full_round_cycle() {
        let mut session = DebateSession::new("s-001", 70.0, 3);
        session.start().unwrap();
        session
            .transition(DebatePhase::Evaluating, "round recorded")
            .unwrap();
        session
            .transition(DebatePhase::RoundInProgress, "below target")
            .unwrap();
        assert_eq!(session.current_round, 2);

        session
            .transition(DebatePhase::Evaluating, "round recorded")
            .unwrap();
        session
            .transition(DebatePhase::Finished, "target reached")
            .unwrap();
        assert!(session.is_complete());
        assert_eq!(session.current_round, 2);
    }

    #[test]
    fn test_abort_from_round() {
        let mut session = DebateSession::new("s-001", 70.0, 3);
        session.start().unwrap();
        session.transition(DebatePhase::Aborted, "timeout").unwrap();
        assert!(session.is_complete());
    }

    #[test]
    fn test_invalid_transition() {
        let mut session = DebateSession::new("s-001", 70.0, 5);
        let err = session
            .transition(DebatePhase::Finished, "skip")
            .unwrap_err();
        assert_eq!(err.from, DebatePhase::NotStarted);
        assert_eq!(err.to, DebatePhase::Finished);
        assert!(err.to_string().contains("not_started"));
    }

    #[test]
    fn test_terminal_no_transitions() {
        let mut session = DebateSession::new("s-001", 70.0, 1);
        session.start().unwrap();
        session.transition(DebatePhase::Evaluating, "done").unwrap();
        session.transition(DebatePhase::Finished, "cap").unwrap();

        let err = session
            .transition(DebatePhase::RoundInProgress, "restart")
            .unwrap_err();
        assert_eq!(err.from, DebatePhase::Finished);
    }

    #[test]
    fn test_evaluate_target_reached() {
        let mut session = DebateSession::new("s-001", 70.0, 3);
        session.start().unwrap();
        assert_eq!(session.evaluate(70.0), RoundVerdict::TargetReached);
        assert_eq!(session.evaluate(88.0), RoundVerdict::TargetReached);
        assert_eq!(session.evaluate(69.9), RoundVerdict::Continue);
    }

    #[test]
    fn test_evaluate_round_cap() {
        let mut session = DebateSession::new("s-001", 70.0, 1);
        session.start().unwrap();
        assert!(!session.has_rounds_remaining());
        assert_eq!(session.evaluate(62.0), RoundVerdict::RoundCapReached);
        assert!(session.evaluate(62.0).should_stop());
        // Target wins over the cap when both hold.
        assert_eq!(session.evaluate(75.0), RoundVerdict::TargetReached);
    }

    #[test]
    fn test_transition_history() {
        let mut session = DebateSession::new("s-001", 70.0, 5);
        session.start().unwrap();
        session.transition(DebatePhase::Evaluating, "recorded").unwrap();
        session.transition(DebatePhase::Finished, "target").unwrap();

        assert_eq!(session.transitions.len(), 3);
        assert_eq!(session.transitions[0].from, DebatePhase::NotStarted);
        assert_eq!(session.transitions[0].round, 1);
        assert_eq!(session.transitions[2].to, DebatePhase::Finished);
    }

    #[test]
    fn test_status_line() {
        let mut session = DebateSession::new("s-042", 70.0, 5);
        session.start().unwrap();
        let line = session.status_line();
        assert!(line.contains("[round_in_progress]"));
        assert!(line.contains("round 1/5"));
        assert!(line.contains("s-042"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(DebatePhase::NotStarted.to_string(), "not_started");
        assert_eq!(DebatePhase::RoundInProgress.to_string(), "round_in_progress");
        assert_eq!(DebatePhase::Evaluating.to_string(), "evaluating");
        assert_eq!(DebatePhase::Finished.to_string(), "finished");
        assert_eq!(DebatePhase::Aborted.to_string(), "aborted");
    }

    #[test]
    fn test_round_record_serde_field_names() {
        let record = RoundRecord {
            round_number: 2,
            centre_left_response: "l".into(),
            centre_response: "c".into(),
            centre_right_response: "r".into(),
            moderator_summary: "s".into(),
            consensus_statement: "cs".into(),
            confidence: 55.5,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["round_number"], 2);
        assert_eq!(json["centre_right_response"], "r");
        assert_eq!(json["confidence"], 55.5);
    }
}
