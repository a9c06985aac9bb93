//! Multi-round ideological debate engine.
//!
//! Three responder roles argue a prompt; a moderator synthesizes each round
//! into a structured verdict with a convergence score. The debate streams
//! one event per phase and stops once the score reaches a target or the
//! round cap is hit.
//!
//! - [`generation`] — the text-generation seam, HTTP backend and stand-in.
//! - [`roles`] — responder roles and their prompts.
//! - [`synthesis`] — the fault-tolerant moderator cascade.
//! - [`debate`] — state machine, events, history store, orchestrator.

pub mod debate;
pub mod generation;
pub mod request;
pub mod roles;
pub mod synthesis;

pub use debate::{
    DebateEvent, DebateEventStream, DebateOrchestrator, HistoryStore, InMemoryHistoryStore,
    RoundRecord, SharedHistoryStore,
};
pub use generation::{
    GenerationConfig, GenerationError, GenerationPort, GenerationService, SharedGenerationPort,
};
pub use request::{DebateRequest, RequestError};
pub use synthesis::{SynthesisConfig, SynthesisPipeline, SynthesisResult};
