//! OpenAI-compatible Chat Completions backend
//!
//! One implementation serves every provider that speaks the OpenAI wire
//! format (OpenAI itself, Azure, Groq, Together, Mistral, Perplexity,
//! DeepSeek). Only the base URL and the reported provider name differ.
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes::providers::{openai::OpenAIProvider, ChatOptions, LLMProvider};
//! use hermes::session::Message;
//!
//! async fn example() {
//!     let provider = OpenAIProvider::new("sk-...");
//!     let messages = vec![Message::system("You are terse."), Message::user("2+2?")];
//!     let response = provider
//!         .chat(messages, vec![], Some("gpt-4o-mini"), ChatOptions::default())
//!         .await
//!         .unwrap();
//!     println!("{}", response.content);
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HermesError, Result};
use crate::session::Message;

use super::{
    parse_provider_error, ChatOptions, LLMProvider, LLMResponse, LLMToolCall, ToolDefinition,
    Usage,
};

/// The OpenAI API endpoint URL.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// The default model when neither the agent nor the call names one.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// HTTP client without idle connection reuse.
///
/// Sub-agent turns run on short-lived runtimes; a pooled connection whose
/// runtime has shut down cannot be reused.
fn http_client() -> Client {
    Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap_or_else(|_| Client::new())
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    /// Null for an assistant message that only carries tool calls
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    r#type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    r#type: &'static str,
    function: WireFunctionDef,
}

#[derive(Debug, Serialize)]
struct WireFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Provider
// ============================================================================

/// Chat Completions client bound to one credential.
pub struct OpenAIProvider {
    /// Name reported through [`LLMProvider::name`] (e.g. "groq")
    provider_name: String,
    api_key: String,
    api_base: String,
    default_model: String,
    client: Client,
}

impl OpenAIProvider {
    /// Create a provider against the public OpenAI endpoint.
    ///
    /// # Example
    /// ```
    /// use hermes::providers::openai::OpenAIProvider;
    /// use hermes::providers::LLMProvider;
    ///
    /// let provider = OpenAIProvider::new("sk-xxx");
    /// assert_eq!(provider.name(), "openai");
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self::compatible("openai", api_key, OPENAI_API_URL)
    }

    /// Create a provider for an OpenAI-compatible endpoint.
    ///
    /// # Arguments
    /// * `provider_name` - Name reported in logs and errors
    /// * `api_key` - Credential sent as a bearer token
    /// * `api_base` - Base URL (a trailing slash is removed)
    pub fn compatible(provider_name: &str, api_key: &str, api_base: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            client: http_client(),
        }
    }

    /// Override the model used when a call names none.
    pub fn with_default_model(mut self, model: &str) -> Self {
        if !model.is_empty() {
            self.default_model = model.to_string();
        }
        self
    }

    /// The base URL requests are sent to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

fn convert_messages(messages: Vec<Message>) -> Vec<WireMessage> {
    messages
        .into_iter()
        .map(|msg| {
            let tool_calls = msg.tool_calls.map(|calls| {
                calls
                    .into_iter()
                    .map(|tc| WireToolCall {
                        id: tc.id,
                        r#type: "function".to_string(),
                        function: WireFunctionCall {
                            name: tc.name,
                            arguments: tc.arguments,
                        },
                    })
                    .collect::<Vec<_>>()
            });

            WireMessage {
                role: msg.role.wire_name(),
                content: if msg.content.is_empty() && tool_calls.is_some() {
                    None
                } else {
                    Some(msg.content)
                },
                tool_calls,
                tool_call_id: msg.tool_call_id,
            }
        })
        .collect()
}

fn convert_tools(tools: Vec<ToolDefinition>) -> Vec<WireTool> {
    tools
        .into_iter()
        .map(|t| WireTool {
            r#type: "function",
            function: WireFunctionDef {
                name: t.name,
                description: t.description,
                parameters: t.parameters,
            },
        })
        .collect()
}

fn convert_response(response: ChatResponse) -> LLMResponse {
    let (content, tool_calls) = match response.choices.into_iter().next() {
        Some(choice) => {
            let calls: Vec<LLMToolCall> = choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|tc| LLMToolCall::new(&tc.id, &tc.function.name, &tc.function.arguments))
                .collect();
            (choice.message.content.unwrap_or_default(), calls)
        }
        None => (String::new(), Vec::new()),
    };

    let llm_response = LLMResponse::with_tools(&content, tool_calls);
    match response.usage {
        Some(usage) => {
            llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens))
        }
        None => llm_response,
    }
}

/// Pull the human-readable message out of an error body when it has one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ============================================================================
// LLMProvider Implementation
// ============================================================================

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        model: Option<&str>,
        options: ChatOptions,
    ) -> Result<LLMResponse> {
        let model = model
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model);

        let request = ChatRequest {
            model: model.to_string(),
            messages: convert_messages(messages),
            tools: if tools.is_empty() {
                None
            } else {
                Some(convert_tools(tools))
            },
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        debug!(provider = %self.provider_name, model = %model, "Chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                HermesError::Provider(format!("{} request failed: {}", self.provider_name, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_provider_error(status.as_u16(), &error_message(&body)).into());
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            HermesError::Provider(format!(
                "Failed to parse {} response: {}",
                self.provider_name, e
            ))
        })?;

        Ok(convert_response(parsed))
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn name(&self) -> &str {
        &self.provider_name
    }
}

// ============================================================================
// Tests
// ============================================================================
