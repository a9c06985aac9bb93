//! Round orchestration for a three-responder, one-moderator debate.
//!
//! ```text
//! NotStarted ──► RoundInProgress ──► Evaluating ──► Finished
//!                    ▲     │              │
//!                    │     ▼              │ below target, rounds left
//!                    │   Aborted          │
//!                    └────────────────────┘
//! ```
//!
//! Each round asks the three responders in fixed order, synthesizes their
//! texts, appends a [`RoundRecord`] to the history store and checks the
//! stop condition. Every step surfaces as a [`DebateEvent`].

pub mod events;
pub mod history;
pub mod orchestrator;
pub mod state;

pub use events::{DebateEvent, Speaker};
pub use history::{HistoryStore, InMemoryHistoryStore, SharedHistoryStore};
pub use orchestrator::{DebateEventStream, DebateOrchestrator};
pub use state::{
    DebatePhase, DebateSession, DebateTransition, RoundRecord, RoundVerdict, TransitionError,
};
