//! Generation port — the single seam between the debate and a text model.
//!
//! Every responder and the moderator talk to a [`GenerationPort`]. The
//! production implementation is [`GenerationService`], which calls an
//! OpenAI-compatible endpoint when a credential is configured and falls
//! back to a deterministic local stand-in when it is not.

pub mod openai;
pub mod standin;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use openai::OpenAiClient;
pub use standin::StandInGenerator;

/// Errors from a generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response parse error: {0}")]
    ParseError(String),

    #[error("Backend returned no choices")]
    EmptyResponse,
}

impl GenerationError {
    /// Whether the backend rejected the `max_completion_tokens` parameter.
    ///
    /// Older chat endpoints only understand `max_tokens`; callers retry once
    /// with the legacy name when this is true.
    pub fn is_token_param_rejection(&self) -> bool {
        match self {
            Self::Api { body, .. } => body.contains("max_completion_tokens"),
            Self::RequestFailed(msg) => msg.contains("max_completion_tokens"),
            _ => false,
        }
    }
}

/// Result type for generation calls.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single chat message sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
    /// Ask the backend for a strict JSON object response.
    pub json_response: bool,
}

impl GenerationOptions {
    /// Free-text options at the given temperature.
    pub fn text(temperature: f32) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }

    /// Strict-JSON options at the given temperature and token budget.
    pub fn json(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
            json_response: true,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            max_output_tokens: 900,
            json_response: false,
        }
    }
}

/// Capability to turn a conversation into text.
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// Generate a completion for `messages`.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: GenerationOptions,
    ) -> GenerationResult<String>;
}

/// Shared reference to a generation port.
pub type SharedGenerationPort = Arc<dyn GenerationPort>;

/// Backend configuration, read from the environment by default.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer credential; `None` selects the stand-in.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,
    /// HTTP client timeout.
    pub timeout: Duration,
}

impl GenerationConfig {
    /// Build from `OPENAI_MODEL`, `OPENAI_API_KEY` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Self {
        Self {
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".into()),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            timeout: Duration::from_secs(300),
        }
    }

    /// A configuration with no credential, i.e. stand-in mode.
    pub fn offline() -> Self {
        Self {
            api_key: None,
            ..Self::default()
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".into(),
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            timeout: Duration::from_secs(300),
        }
    }
}

/// The configured generation port.
///
/// Holds an HTTP client only when a credential was supplied; otherwise
/// every call is answered by [`StandInGenerator`] without leaving the
/// process.
pub struct GenerationService {
    client: Option<OpenAiClient>,
    stand_in: StandInGenerator,
}

impl GenerationService {
    /// Create the service from configuration.
    pub fn new(config: GenerationConfig) -> GenerationResult<Self> {
        let client = match config.api_key.clone() {
            Some(_) => Some(OpenAiClient::new(config)?),
            None => None,
        };
        Ok(Self {
            client,
            stand_in: StandInGenerator,
        })
    }

    /// Whether a real backend is configured.
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Create a shared reference to this service.
    pub fn shared(self) -> SharedGenerationPort {
        Arc::new(self)
    }
}

#[async_trait]
impl GenerationPort for GenerationService {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: GenerationOptions,
    ) -> GenerationResult<String> {
        match &self.client {
            Some(client) => client.generate(messages, options).await,
            None => {
                debug!(messages = messages.len(), "No backend configured, using stand-in");
                self.stand_in.generate(messages, options).await
            }
        }
    }
}
