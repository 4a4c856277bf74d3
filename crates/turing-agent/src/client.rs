//! LLM gateway: one `generate` call routed to the right provider.
//!
//! This module provides:
//! - The [`LlmGateway`] trait the agents and the verdict step talk to
//! - An OpenAI-compatible chat completions client (OpenAI and OpenRouter)
//! - An Anthropic Messages API client
//! - [`ProviderRouter`], which picks a client by model-id prefix

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use turing_models::{ChatRole, ChatTurn};

use crate::config::{Provider, ProviderKeys};
use crate::error::{AgentError, Result};

/// OpenAI chat completions endpoint.
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenRouter chat completions endpoint.
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Anthropic messages endpoint.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default completion budget. Replies are meant to be short.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Placeholder user turn for providers that refuse to let the assistant speak first.
const OPENING_CUE: &str = "(The conversation begins now.)";

/// Sends a message history to a model and returns the completion text.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a completion for `messages` with `model`.
    async fn generate(&self, messages: &[ChatTurn], temperature: f32, model: &str)
        -> Result<String>;
}

/// Client for OpenAI-compatible chat completion APIs.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: &'static str,
    provider: Provider,
}

impl OpenAiCompatibleClient {
    /// Client for api.openai.com.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: OPENAI_API_URL,
            provider: Provider::OpenAI,
        }
    }

    /// Client for openrouter.ai.
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: OPENROUTER_API_URL,
            provider: Provider::OpenRouter,
        }
    }

    /// Send a chat completion request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        trace!("Sending chat request: {:?}", request);

        let mut builder = self
            .client
            .post(self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        if self.provider == Provider::OpenRouter {
            builder = builder.header("X-Title", "Turing Arena");
        }

        let response = builder
            .json(request)
            .send()
            .await
            .map_err(|e| AgentError::ModelInvocation(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ModelInvocation(format!(
                "{} API error {}: {}",
                self.provider, status, text
            )));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ResponseParse(format!("Failed to parse response: {}", e)))?;

        debug!(
            provider = %self.provider,
            "Chat response received: {} tokens used",
            response.usage.as_ref().map_or(0, |u| u.total_tokens)
        );

        Ok(response)
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: String,

    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Convert from an agent memory turn.
    pub fn from_turn(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: turn.content.clone(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Unique identifier for this completion.
    pub id: String,

    /// Completion choices.
    pub choices: Vec<ChatChoice>,

    /// Token usage information.
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// Index of this choice.
    pub index: u32,

    /// The message for this choice.
    pub message: ResponseMessage,

    /// Finish reason (stop, length, etc.).
    pub finish_reason: Option<String>,
}

/// Message in a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Role (always "assistant" for responses).
    pub role: String,

    /// Text content of the response.
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Send a messages request.
    pub async fn messages(&self, request: &AnthropicRequest) -> Result<AnthropicResponse> {
        trace!("Sending anthropic request: {:?}", request);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AgentError::ModelInvocation(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ModelInvocation(format!(
                "anthropic API error {}: {}",
                status, text
            )));
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ResponseParse(format!("Failed to parse response: {}", e)))?;

        debug!(
            provider = "anthropic",
            "Messages response received: {} output tokens",
            response.usage.as_ref().map_or(0, |u| u.output_tokens)
        );

        Ok(response)
    }
}

/// Anthropic messages request. The system prompt travels outside `messages`.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub messages: Vec<ChatMessage>,

    pub max_tokens: u32,

    pub temperature: f32,
}

impl AnthropicRequest {
    /// Builds a request from agent memory.
    ///
    /// System turns are joined into `system`. The API requires the first
    /// message to come from the user, so an opening cue is inserted when
    /// the history is empty or starts with an assistant turn.
    pub fn from_turns(model: &str, turns: &[ChatTurn], temperature: f32, max_tokens: u32) -> Self {
        let system: Vec<&str> = turns
            .iter()
            .filter(|t| t.role == ChatRole::System)
            .map(|t| t.content.as_str())
            .collect();

        let mut messages: Vec<ChatMessage> = turns
            .iter()
            .filter(|t| t.role != ChatRole::System)
            .map(ChatMessage::from_turn)
            .collect();

        if messages.first().map_or(true, |m| m.role != "user") {
            messages.insert(
                0,
                ChatMessage {
                    role: "user".to_string(),
                    content: OPENING_CUE.to_string(),
                },
            );
        }

        Self {
            model: model.to_string(),
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages,
            max_tokens,
            temperature,
        }
    }
}

/// Anthropic messages response.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    pub content: Vec<AnthropicContent>,
    pub usage: Option<AnthropicUsage>,
}

impl AnthropicResponse {
    /// Concatenated text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A content block in an Anthropic response.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: Option<String>,
}

/// Anthropic token usage.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Routes `generate` calls to the provider that serves the model id.
#[derive(Clone)]
pub struct ProviderRouter {
    openai: Option<OpenAiCompatibleClient>,
    anthropic: Option<AnthropicClient>,
    openrouter: Option<OpenAiCompatibleClient>,
    max_tokens: u32,
}

impl ProviderRouter {
    /// Creates a router with a client for every provider that has a key.
    pub fn new(keys: &ProviderKeys) -> Self {
        Self {
            openai: keys.openai.as_deref().map(|k| OpenAiCompatibleClient::openai(k)),
            anthropic: keys.anthropic.as_deref().map(|k| AnthropicClient::new(k)),
            openrouter: keys
                .openrouter
                .as_deref()
                .map(|k| OpenAiCompatibleClient::openrouter(k)),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Creates a router from environment variables.
    pub fn from_env() -> Self {
        Self::new(&ProviderKeys::from_env())
    }

    /// Set the completion budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Returns true if a client is configured for `provider`.
    pub fn is_available(&self, provider: Provider) -> bool {
        match provider {
            Provider::OpenAI => self.openai.is_some(),
            Provider::Anthropic => self.anthropic.is_some(),
            Provider::OpenRouter => self.openrouter.is_some(),
        }
    }

    fn missing_key(provider: Provider) -> AgentError {
        AgentError::Configuration(format!(
            "Missing {} environment variable",
            provider.api_key_env()
        ))
    }
}

#[async_trait]
impl LlmGateway for ProviderRouter {
    async fn generate(
        &self,
        messages: &[ChatTurn],
        temperature: f32,
        model: &str,
    ) -> Result<String> {
        let provider = Provider::for_model(model).ok_or_else(|| {
            AgentError::Configuration(format!("no provider serves model id: {}", model))
        })?;

        debug!(%provider, model, turns = messages.len(), "Routing generation request");

        match provider {
            Provider::Anthropic => {
                let client = self
                    .anthropic
                    .as_ref()
                    .ok_or_else(|| Self::missing_key(provider))?;
                let request =
                    AnthropicRequest::from_turns(model, messages, temperature, self.max_tokens);
                let response = client.messages(&request).await?;
                Ok(response.text())
            }
            Provider::OpenAI | Provider::OpenRouter => {
                let client = if provider == Provider::OpenAI {
                    self.openai.as_ref()
                } else {
                    self.openrouter.as_ref()
                }
                .ok_or_else(|| Self::missing_key(provider))?;

                let request = ChatRequest {
                    model: model.to_string(),
                    messages: messages.iter().map(ChatMessage::from_turn).collect(),
                    max_tokens: Some(self.max_tokens),
                    temperature: Some(temperature),
                };
                let response = client.chat(&request).await?;
                response.text().map(str::to_string).ok_or_else(|| {
                    AgentError::ResponseParse(format!("empty completion from {}", provider))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns() -> Vec<ChatTurn> {
        vec![
            ChatTurn::new(ChatRole::System, "You are a person."),
            ChatTurn::new(ChatRole::User, "hey, what's up?"),
        ]
    }

    #[test]
    fn test_chat_message_from_turn() {
        let msg = ChatMessage::from_turn(&ChatTurn::new(ChatRole::Assistant, "hi"));
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.content, "hi");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: turns().iter().map(ChatMessage::from_turn).collect(),
            max_tokens: Some(300),
            temperature: Some(0.9),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "gen-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "not much, you?"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id, "gen-123");
        assert_eq!(response.text(), Some("not much, you?"));
    }

    #[test]
    fn test_anthropic_request_moves_system_out() {
        let request = AnthropicRequest::from_turns("claude-sonnet-4-20250514", &turns(), 0.7, 200);
        assert_eq!(request.system.as_deref(), Some("You are a person."));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }

    #[test]
    fn test_anthropic_request_inserts_opening_cue() {
        let only_system = vec![ChatTurn::new(ChatRole::System, "Ask questions.")];
        let request = AnthropicRequest::from_turns("claude-x", &only_system, 0.7, 200);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, OPENING_CUE);

        let assistant_first = vec![
            ChatTurn::new(ChatRole::System, "Ask questions."),
            ChatTurn::new(ChatRole::Assistant, "so where are you from?"),
            ChatTurn::new(ChatRole::User, "ohio"),
        ];
        let request = AnthropicRequest::from_turns("claude-x", &assistant_first, 0.7, 200);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.messages[1].role, "assistant");
    }

    #[test]
    fn test_anthropic_response_text() {
        let json = r#"{
            "id": "msg_1",
            "content": [{"type": "text", "text": "honestly? "}, {"type": "text", "text": "tired"}],
            "usage": {"input_tokens": 12, "output_tokens": 3}
        }"#;
        let response: AnthropicResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "honestly? tired");
    }

    #[tokio::test]
    async fn test_router_missing_key() {
        let router = ProviderRouter::new(&ProviderKeys::default());
        assert!(!router.is_available(Provider::OpenAI));

        let err = router.generate(&turns(), 0.5, "gpt-4o").await.unwrap_err();
        assert!(matches!(err, AgentError::Configuration(ref m) if m.contains("OPENAI_API_KEY")));
    }

    #[tokio::test]
    async fn test_router_unknown_model() {
        let router = ProviderRouter::new(&ProviderKeys::default());
        let err = router.generate(&turns(), 0.5, "mystery-model").await.unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
    }
}
