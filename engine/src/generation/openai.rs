//! OpenAI-compatible chat completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    ChatMessage, GenerationConfig, GenerationError, GenerationOptions, GenerationPort,
    GenerationResult,
};

/// Name of the token-limit parameter sent with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenParam {
    /// Current name (`max_completion_tokens`).
    Completion,
    /// Legacy name (`max_tokens`) for older endpoints.
    Legacy,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// HTTP client for a chat completions endpoint.
pub struct OpenAiClient {
    config: GenerationConfig,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client. Fails when no credential is configured.
    pub fn new(config: GenerationConfig) -> GenerationResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(GenerationError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;
        Ok(Self {
            config,
            api_key,
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        options: GenerationOptions,
        param: TokenParam,
    ) -> GenerationResult<String> {
        let (max_completion_tokens, max_tokens) = match param {
            TokenParam::Completion => (Some(options.max_output_tokens), None),
            TokenParam::Legacy => (None, Some(options.max_output_tokens)),
        };
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: options.temperature,
            max_completion_tokens,
            max_tokens,
            response_format: options
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        debug!(
            model = %self.config.model,
            temperature = options.temperature,
            json = options.json_response,
            ?param,
            "Sending chat completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl GenerationPort for OpenAiClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: GenerationOptions,
    ) -> GenerationResult<String> {
        match self.send(messages, options, TokenParam::Completion).await {
            Err(e) if e.is_token_param_rejection() => {
                warn!("Backend rejected max_completion_tokens, retrying with max_tokens");
                self.send(messages, options, TokenParam::Legacy).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> GenerationConfig {
        GenerationConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:9999/v1/".to_string(),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_client_requires_key() {
        let err = OpenAiClient::new(GenerationConfig::offline()).err().unwrap();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAiClient::new(config_with_key()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_request_uses_one_token_param() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: 0.25,
            max_completion_tokens: Some(800),
            max_tokens: None,
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_completion_tokens"], 800);
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["response_format"]["type"], "json_object");

        let legacy = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: 0.6,
            max_completion_tokens: None,
            max_tokens: Some(900),
            response_format: None,
        };
        let json = serde_json::to_value(&legacy).unwrap();
        assert_eq!(json["max_tokens"], 900);
        assert!(json.get("max_completion_tokens").is_none());
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_null_content_parses() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
