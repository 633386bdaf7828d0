//! Provider types for Hermes
//!
//! The "inference capability" of an agent is an [`LLMProvider`]: one chat
//! completion round trip, optionally offering tools. The tool loop that
//! turns repeated round trips into a single agent turn is
//! `Agent::execute` in `agent::loop`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::Message;

/// Definition of a tool offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// The name of the tool (unique within a catalog)
    pub name: String,
    /// Human-readable description the model uses to decide when to call it
    pub description: String,
    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    ///
    /// # Example
    /// ```
    /// use hermes::providers::ToolDefinition;
    /// use serde_json::json;
    ///
    /// let tool = ToolDefinition::new(
    ///     "consult_analyst",
    ///     "Consults the specialized agent 'Analyst'.",
    ///     json!({
    ///         "type": "object",
    ///         "properties": { "query": { "type": "string" } },
    ///         "required": ["query"]
    ///     }),
    /// );
    /// assert_eq!(tool.name, "consult_analyst");
    /// ```
    pub fn new(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// Trait for LLM chat backends.
///
/// A provider is bound to one credential at construction; rotating
/// credentials means building a new provider (see `agent::binding`).
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send a chat completion request to the LLM.
    ///
    /// # Arguments
    /// * `messages` - The full request: system prompt, history and user turn
    /// * `tools` - Available tools the LLM can call
    /// * `model` - Optional model override (uses default if None)
    /// * `options` - Sampling options
    async fn chat(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        model: Option<&str>,
        options: ChatOptions,
    ) -> Result<LLMResponse>;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// Options for chat completion requests.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling, already clamped to `[0, 1]` by the agent
    pub temperature: Option<f32>,
}

impl ChatOptions {
    /// Create new default chat options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of tokens to generate.
    ///
    /// # Example
    /// ```
    /// use hermes::providers::ChatOptions;
    ///
    /// let options = ChatOptions::new().with_max_tokens(1000).with_temperature(0.2);
    /// assert_eq!(options.max_tokens, Some(1000));
    /// assert_eq!(options.temperature, Some(0.2));
    /// ```
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from one chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    /// Text content of the response
    pub content: String,
    /// Tool calls made by the LLM (if any)
    pub tool_calls: Vec<LLMToolCall>,
    /// Token usage information (if available)
    pub usage: Option<Usage>,
}

impl LLMResponse {
    /// Create a simple text response with no tool calls.
    ///
    /// # Example
    /// ```
    /// use hermes::providers::LLMResponse;
    ///
    /// let response = LLMResponse::text("4");
    /// assert_eq!(response.content, "4");
    /// assert!(!response.has_tool_calls());
    /// ```
    pub fn text(content: &str) -> Self {
        Self {
            content: content.to_string(),
            tool_calls: vec![],
            usage: None,
        }
    }

    /// Create a response with tool calls.
    pub fn with_tools(content: &str, tool_calls: Vec<LLMToolCall>) -> Self {
        Self {
            content: content.to_string(),
            tool_calls,
            usage: None,
        }
    }

    /// Check if this response contains any tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Set usage information for this response.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LLMToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// JSON-encoded arguments for the tool
    pub arguments: String,
}

impl LLMToolCall {
    /// Create a new tool call.
    pub fn new(id: &str, name: &str, arguments: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used (prompt + completion)
    pub total_tokens: u32,
}

impl Usage {
    /// Create new usage information.
    ///
    /// # Example
    /// ```
    /// use hermes::providers::Usage;
    ///
    /// let usage = Usage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Fold another round trip's usage into this total.
    pub fn accumulate(&mut self, other: &Usage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_llm_response_with_tools() {
        let tool_call = LLMToolCall::new("call_1", "consult_a", r#"{"query": "2+2?"}"#);
        let response = LLMResponse::with_tools("", vec![tool_call]);
        assert!(response.has_tool_calls());
        assert_eq!(response.tool_calls[0].name, "consult_a");
    }

    #[test]
    fn test_llm_response_with_usage() {
        let response = LLMResponse::text("hi").with_usage(Usage::new(3, 1));
        assert_eq!(response.usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn test_usage_accumulate() {
        let mut total = Usage::default();
        total.accumulate(&Usage::new(10, 5));
        total.accumulate(&Usage::new(7, 3));
        assert_eq!(total, Usage::new(17, 8));
    }

    #[test]
    fn test_chat_options_default() {
        let options = ChatOptions::new();
        assert!(options.max_tokens.is_none());
        assert!(options.temperature.is_none());
    }
}
