//! Error types for Hermes
//!
//! This module defines all error types used by the agent runtime.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.
//!
//! Errors fall into two families:
//!
//! - **Construction-time** (`Config`, `BackendUnavailable`, `Composition`):
//!   raised while building agents or rebinding a credential, fatal for that
//!   agent instance.
//! - **Execution-time** (everything else): raised during a single turn. The
//!   runtime returns them as values so the boundary (CLI, HTTP) decides how
//!   to render them.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Provider Error Classification
// ============================================================================

/// Structured provider error classification.
///
/// Categorizes LLM provider HTTP errors so callers can branch on them
/// without string matching.
#[derive(Debug)]
pub enum ProviderError {
    /// 401: Invalid API key or authentication failure
    Auth(String),
    /// 429: Rate limit or quota exceeded
    RateLimit(String),
    /// 402: Payment required or billing issue
    Billing(String),
    /// 500/502/503/504: Server-side errors
    ServerError(String),
    /// 400: Bad request, invalid JSON, malformed parameters
    InvalidRequest(String),
    /// 404: Model not found or endpoint not available
    ModelNotFound(String),
    /// 408: Request timed out
    Timeout(String),
    /// Catch-all for unrecognized errors
    Unknown(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            ProviderError::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            ProviderError::Billing(msg) => write!(f, "Billing error: {}", msg),
            ProviderError::ServerError(msg) => write!(f, "Server error: {}", msg),
            ProviderError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ProviderError::ModelNotFound(msg) => write!(f, "Model not found: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ProviderError::Unknown(msg) => write!(f, "Unknown provider error: {}", msg),
        }
    }
}

impl From<ProviderError> for HermesError {
    fn from(err: ProviderError) -> Self {
        HermesError::ProviderTyped(err)
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for Hermes operations.
#[derive(Error, Debug)]
pub enum HermesError {
    /// Configuration errors (empty credential pool, unsupported provider,
    /// unknown agent reference, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The provider is recognized but no backend for it is compiled in
    #[error("Backend unavailable for provider '{provider}': {reason}")]
    BackendUnavailable { provider: String, reason: String },

    /// Agent composition errors (cycles or excessive nesting of agents-as-tools)
    #[error("Composition error: {0}")]
    Composition(String),

    /// Provider errors (API failures, malformed responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Structured provider error with HTTP classification.
    #[error("Provider error: {0}")]
    ProviderTyped(ProviderError),

    /// Tool execution errors (invalid arguments, handler failures, etc.)
    #[error("Tool error: {0}")]
    Tool(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HermesError {
    /// Returns `true` for failures that happen inside a single turn
    /// (network, malformed response, tool or sub-agent failure), as opposed
    /// to construction-time failures.
    pub fn is_execution(&self) -> bool {
        !matches!(
            self,
            HermesError::Config(_)
                | HermesError::BackendUnavailable { .. }
                | HermesError::Composition(_)
        )
    }
}

/// A specialized `Result` type for Hermes operations.
pub type Result<T> = std::result::Result<T, HermesError>;
