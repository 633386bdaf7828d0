//! Providers module - LLM backends and the model capability factory
//!
//! This module defines the `LLMProvider` trait and common chat types, the
//! [`Tokenizer`] paired with every binding, and the [`ProviderRegistry`]
//! that turns `(provider, model, credential, temperature)` into a live
//! binding.
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes::providers::{LLMProvider, ChatOptions};
//! use hermes::providers::openai::OpenAIProvider;
//! use hermes::session::Message;
//!
//! async fn example() {
//!     let provider = OpenAIProvider::new("your-api-key");
//!     let messages = vec![Message::user("Hello!")];
//!     let options = ChatOptions::new().with_max_tokens(1000);
//!
//!     let response = provider.chat(messages, vec![], None, options).await.unwrap();
//!     println!("Response: {}", response.content);
//! }
//! ```

pub mod openai;
mod registry;
mod tokenizer;
mod types;

use crate::error::ProviderError;

pub use openai::OpenAIProvider;
pub use registry::{provider_spec, BindingFactory, ProviderRegistry, ProviderSpec, PROVIDER_REGISTRY};
pub use tokenizer::{Tokenizer, WordPieceTokenizer};
pub use types::{ChatOptions, LLMProvider, LLMResponse, LLMToolCall, ToolDefinition, Usage};

/// Parse an HTTP status code and response body into a structured [`ProviderError`].
pub fn parse_provider_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Auth(body.to_string()),
        402 => ProviderError::Billing(body.to_string()),
        404 => ProviderError::ModelNotFound(body.to_string()),
        408 => ProviderError::Timeout(body.to_string()),
        429 => ProviderError::RateLimit(body.to_string()),
        400 => ProviderError::InvalidRequest(body.to_string()),
        500..=599 => ProviderError::ServerError(body.to_string()),
        _ => ProviderError::Unknown(format!("HTTP {}: {}", status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_error_auth() {
        assert!(matches!(parse_provider_error(401, "bad key"), ProviderError::Auth(_)));
        assert!(matches!(parse_provider_error(403, "forbidden"), ProviderError::Auth(_)));
    }

    #[test]
    fn test_parse_provider_error_429() {
        let err = parse_provider_error(429, "rate limited");
        assert!(matches!(err, ProviderError::RateLimit(_)));
    }

    #[test]
    fn test_parse_provider_error_400() {
        let err = parse_provider_error(400, "bad json");
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }

    #[test]
    fn test_parse_provider_error_5xx() {
        assert!(matches!(parse_provider_error(502, "bad gateway"), ProviderError::ServerError(_)));
        assert!(matches!(parse_provider_error(504, "timeout"), ProviderError::ServerError(_)));
    }

    #[test]
    fn test_parse_provider_error_timeout() {
        let err = parse_provider_error(408, "slow");
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[test]
    fn test_parse_provider_error_unknown() {
        let err = parse_provider_error(418, "teapot");
        assert!(matches!(err, ProviderError::Unknown(_)));
        assert!(err.to_string().contains("HTTP 418"));
    }
}
