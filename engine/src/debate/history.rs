//! Round history — append-only per-session sequence of round records.
//!
//! Defines the store interface and an in-memory implementation keyed by
//! session identifier. Sessions are independent; a session is written only
//! by the single debate that owns it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::state::RoundRecord;

/// Trait for round history stores.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a completed round to a session.
    async fn append(&self, session_id: &str, record: RoundRecord);

    /// All rounds recorded for a session, in append order.
    async fn history(&self, session_id: &str) -> Vec<RoundRecord>;

    /// Drop every round recorded for a session.
    async fn clear(&self, session_id: &str);
}

/// Shared reference to a history store.
pub type SharedHistoryStore = Arc<dyn HistoryStore>;

/// In-memory implementation of [`HistoryStore`].
#[derive(Default)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<HashMap<String, Vec<RoundRecord>>>,
}

impl InMemoryHistoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared reference to this store.
    pub fn shared(self) -> SharedHistoryStore {
        Arc::new(self)
    }

    /// Number of sessions currently holding rounds.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, session_id: &str, record: RoundRecord) {
        let mut sessions = self.sessions.write().await;
        let rounds = sessions.entry(session_id.to_string()).or_default();
        rounds.push(record);
        debug!(session_id, rounds = rounds.len(), "Round appended");
    }

    async fn history(&self, session_id: &str) -> Vec<RoundRecord> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn clear(&self, session_id: &str) {
        if self.sessions.write().await.remove(session_id).is_some() {
            debug!(session_id, "Session history cleared");
        }
    }
}
