//! Model bindings: one credential's live inference capability.
//!
//! A [`ModelBinding`] pairs a provider client (already authenticated with a
//! single credential) with the tokenizer used for memory budgeting. Bindings
//! are immutable; rotating credentials builds a fresh one through the
//! [`ProviderRegistry`](crate::providers::ProviderRegistry).

use std::fmt;
use std::sync::Arc;

use crate::providers::{ChatOptions, LLMProvider, Tokenizer, WordPieceTokenizer};
use crate::utils::logging::mask_credential;

/// Everything a provider factory needs to produce a binding.
#[derive(Clone)]
pub struct BindingRequest {
    /// Provider name, e.g. "openai"
    pub provider: String,
    /// Model identifier, e.g. "gpt-4o-mini"
    pub model: String,
    /// The credential drawn from the agent's key pool
    pub credential: String,
    /// Sampling temperature, already clamped to `[0, 1]`
    pub temperature: f32,
    /// Optional base URL override for OpenAI-compatible endpoints
    pub api_base: Option<String>,
}

impl fmt::Debug for BindingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRequest")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("credential", &mask_credential(&self.credential))
            .field("temperature", &self.temperature)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Live inference capability plus tokenizer for the active credential.
#[derive(Clone)]
pub struct ModelBinding {
    provider: Arc<dyn LLMProvider>,
    tokenizer: Arc<dyn Tokenizer>,
    model: String,
    temperature: f32,
}

impl ModelBinding {
    /// Bind a provider client with the default tokenizer.
    ///
    /// An empty `model` falls back to the provider's default model.
    pub fn new(provider: Arc<dyn LLMProvider>, model: &str, temperature: f32) -> Self {
        let model = if model.is_empty() {
            provider.default_model().to_string()
        } else {
            model.to_string()
        };
        Self {
            provider,
            tokenizer: Arc::new(WordPieceTokenizer::default()),
            model,
            temperature,
        }
    }

    /// Replace the tokenizer shipped with this binding.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// The authenticated provider client.
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// The tokenizer paired with this binding.
    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// The model identifier requests are sent with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Chat options for a request made through this binding.
    pub fn chat_options(&self, max_tokens: Option<u32>) -> ChatOptions {
        let options = ChatOptions::new().with_temperature(self.temperature);
        match max_tokens {
            Some(max) => options.with_max_tokens(max),
            None => options,
        }
    }
}

impl fmt::Debug for ModelBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBinding")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}
