//! Debate orchestrator — drives responders and the moderator round by round.
//!
//! Ties together the state machine, the responder roles, the synthesis
//! pipeline and the history store. A run is a lazy stream: each poll
//! performs at most one generation call and yields exactly one event.

use std::pin::Pin;
use std::sync::Arc;

use futures::stream::{self, Stream};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::events::DebateEvent;
use super::history::SharedHistoryStore;
use super::state::{DebatePhase, DebateSession, RoundRecord};
use crate::generation::SharedGenerationPort;
use crate::request::DebateRequest;
use crate::roles::{Responder, ResponderRole};
use crate::synthesis::{RoundResponses, SynthesisConfig, SynthesisPipeline, SynthesisResult};

/// Stream of events for one debate.
pub type DebateEventStream = Pin<Box<dyn Stream<Item = DebateEvent> + Send>>;

/// Runs debates against a generation port and a history store.
#[derive(Clone)]
pub struct DebateOrchestrator {
    responders: Arc<Vec<Responder>>,
    pipeline: Arc<SynthesisPipeline>,
    store: SharedHistoryStore,
}

impl DebateOrchestrator {
    pub fn new(
        port: SharedGenerationPort,
        store: SharedHistoryStore,
        synthesis: SynthesisConfig,
    ) -> Self {
        let responders = ResponderRole::ALL
            .iter()
            .map(|role| Responder::new(*role, port.clone()))
            .collect();
        Self {
            responders: Arc::new(responders),
            pipeline: Arc::new(SynthesisPipeline::new(port, synthesis)),
            store,
        }
    }

    /// Start a debate. The request is expected to be validated already.
    ///
    /// The returned stream is single-pass; every call opens a new session.
    pub fn run(&self, request: DebateRequest) -> DebateEventStream {
        let session = DebateSession::new(
            &Uuid::new_v4().to_string(),
            request.confidence_target,
            request.max_rounds,
        );
        info!(
            session = %session.id,
            target = request.confidence_target,
            max_rounds = request.max_rounds,
            "Debate accepted"
        );

        let run = DebateRun {
            prompt: request.prompt,
            session,
            responders: self.responders.clone(),
            pipeline: self.pipeline.clone(),
            store: self.store.clone(),
            step: Step::Start,
            history: Vec::new(),
            texts: Vec::with_capacity(ResponderRole::ALL.len()),
            synthesis: None,
            last: None,
            released: false,
        };

        Box::pin(stream::unfold(run, |mut run| async move {
            let event = run.advance().await?;
            Some((event, run))
        }))
    }
}

/// Next thing a run will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    BeginRound,
    Think(usize),
    Respond(usize),
    ModeratorThinking,
    Synthesize,
    Record,
    NextRound,
    Finish,
    Done,
}

/// Internal state for the unfold stream.
struct DebateRun {
    prompt: String,
    session: DebateSession,
    responders: Arc<Vec<Responder>>,
    pipeline: Arc<SynthesisPipeline>,
    store: SharedHistoryStore,
    step: Step,
    /// History snapshot taken at the start of the current round.
    history: Vec<RoundRecord>,
    /// Responder texts of the current round, in speaking order.
    texts: Vec<String>,
    /// Synthesis of the current round, until it is recorded.
    synthesis: Option<SynthesisResult>,
    /// Synthesis of the last recorded round.
    last: Option<SynthesisResult>,
    /// Set once the session's history has been cleared.
    released: bool,
}

impl DebateRun {
    fn round(&self) -> u32 {
        self.session.current_round
    }

    /// Perform the next step and return its event; `None` ends the stream.
    async fn advance(&mut self) -> Option<DebateEvent> {
        loop {
            match self.step {
                Step::Start => {
                    if let Err(e) = self.session.start() {
                        return Some(self.abort(e).await);
                    }
                    self.step = Step::BeginRound;
                    return Some(DebateEvent::started(self.session.confidence_target));
                }
                Step::NextRound => {
                    if let Err(e) = self
                        .session
                        .transition(DebatePhase::RoundInProgress, "confidence below target")
                    {
                        return Some(self.abort(e).await);
                    }
                    self.step = Step::BeginRound;
                }
                Step::BeginRound => {
                    self.history = self.store.history(&self.session.id).await;
                    self.texts.clear();
                    self.step = Step::Think(0);
                    debug!(status = %self.session.status_line(), "Round started");
                    return Some(DebateEvent::round_start(self.round()));
                }
                Step::Think(idx) => {
                    self.step = Step::Respond(idx);
                    let role = self.responders[idx].role();
                    return Some(DebateEvent::agent_thinking(self.round(), role));
                }
                Step::Respond(idx) => {
                    let responder = &self.responders[idx];
                    let role = responder.role();
                    let reply = responder
                        .respond(&self.prompt, &self.history, self.round())
                        .await;
                    return Some(match reply {
                        Ok(text) => {
                            self.texts.push(text.clone());
                            self.step = if idx + 1 < self.responders.len() {
                                Step::Think(idx + 1)
                            } else {
                                Step::ModeratorThinking
                            };
                            DebateEvent::agent_response(self.round(), role, text)
                        }
                        Err(e) => {
                            warn!(round = self.round(), role = %role, error = %e, "Responder failed");
                            self.abort(e).await
                        }
                    });
                }
                Step::ModeratorThinking => {
                    self.step = Step::Synthesize;
                    return Some(DebateEvent::moderator_thinking(self.round()));
                }
                Step::Synthesize => {
                    let responses = self.responses();
                    let result = self
                        .pipeline
                        .synthesize(&self.prompt, self.round(), &responses, &self.history)
                        .await;
                    self.synthesis = Some(result.clone());
                    self.step = Step::Record;
                    return Some(DebateEvent::moderator_response(self.round(), result));
                }
                Step::Record => {
                    let Some(result) = self.synthesis.take() else {
                        return Some(self.abort("round recorded without a synthesis").await);
                    };
                    let responses = self.responses();
                    let record = RoundRecord {
                        round_number: self.round(),
                        centre_left_response: responses.centre_left,
                        centre_response: responses.centre,
                        centre_right_response: responses.centre_right,
                        moderator_summary: result.summary.clone(),
                        consensus_statement: result.consensus_statement.clone(),
                        confidence: result.confidence,
                    };
                    self.store.append(&self.session.id, record.clone()).await;

                    if let Err(e) = self
                        .session
                        .transition(DebatePhase::Evaluating, "round recorded")
                    {
                        return Some(self.abort(e).await);
                    }
                    let verdict = self.session.evaluate(result.confidence);
                    info!(
                        session = %self.session.id,
                        round = record.round_number,
                        confidence = result.confidence,
                        verdict = %verdict,
                        "Round complete"
                    );
                    self.step = if verdict.should_stop() {
                        Step::Finish
                    } else {
                        Step::NextRound
                    };
                    self.last = Some(result.clone());
                    return Some(DebateEvent::round(record, result));
                }
                Step::Finish => {
                    self.step = Step::Done;
                    if let Err(e) = self
                        .session
                        .transition(DebatePhase::Finished, "stop condition met")
                    {
                        return Some(self.abort(e).await);
                    }
                    let (consensus, confidence) = self
                        .last
                        .as_ref()
                        .map(|r| (r.consensus_statement.clone(), r.confidence))
                        .unwrap_or_default();
                    self.release().await;
                    info!(
                        session = %self.session.id,
                        rounds = self.round(),
                        confidence,
                        "Debate completed"
                    );
                    return Some(DebateEvent::final_event(consensus, confidence, self.round()));
                }
                Step::Done => return None,
            }
        }
    }

    fn responses(&self) -> RoundResponses {
        let text = |idx: usize| self.texts.get(idx).cloned().unwrap_or_default();
        RoundResponses::new(text(0), text(1), text(2))
    }

    /// End the run with an error event and release the session's history.
    async fn abort(&mut self, cause: impl std::fmt::Display) -> DebateEvent {
        self.step = Step::Done;
        if let Err(e) = self
            .session
            .transition(DebatePhase::Aborted, "generation failed")
        {
            debug!(error = %e, "Abort from non-abortable phase");
        }
        self.release().await;
        DebateEvent::error(cause)
    }

    async fn release(&mut self) {
        self.store.clear(&self.session.id).await;
        self.released = true;
    }
}

/// A stream dropped mid-debate still releases its session's history.
impl Drop for DebateRun {
    fn drop(&mut self) {
        if self.released || self.step == Step::Start {
            return;
        }
        let store = self.store.clone();
        let id = self.session.id.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(session = %id, "Debate stream dropped, clearing history");
                handle.spawn(async move { store.clear(&id).await });
            }
            Err(_) => warn!(session = %id, "Debate stream dropped outside a runtime, history kept"),
        }
    }
}
