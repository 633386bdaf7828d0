//! Tool types for Hermes
//!
//! This module defines the `Tool` trait every catalog entry implements, the
//! `ToolOutput` handed back to the model, and the `ToolContext` passed to
//! each invocation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::Agent;
use crate::error::Result;

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOrigin {
    /// A plain function or hand-written tool.
    Native,
    /// A synthesized wrapper consulting another agent.
    SubAgent,
}

impl std::fmt::Display for ToolOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::SubAgent => write!(f, "sub_agent"),
        }
    }
}

/// Result of a tool invocation as seen by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Text sent back to the model as the tool result
    pub for_llm: String,
    /// Whether this result describes a failure
    pub is_error: bool,
}

impl ToolOutput {
    /// Successful result.
    pub fn llm_only(content: impl Into<String>) -> Self {
        Self {
            for_llm: content.into(),
            is_error: false,
        }
    }

    /// Error result. The model still receives the text.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            for_llm: content.into(),
            is_error: true,
        }
    }
}

/// Trait that all tools must implement.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use hermes::tools::{Tool, ToolContext, ToolOutput};
/// use hermes::error::Result;
///
/// struct Clock;
///
/// #[async_trait]
/// impl Tool for Clock {
///     fn name(&self) -> &str { "clock" }
///     fn description(&self) -> &str { "Tells the time" }
///     fn parameters(&self) -> Value {
///         serde_json::json!({"type": "object", "properties": {}, "required": []})
///     }
///     async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<ToolOutput> {
///         Ok(ToolOutput::llm_only("noon"))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within a catalog.
    fn name(&self) -> &str;

    /// Description sent to the model and embedded in the system prompt.
    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters.
    fn parameters(&self) -> Value;

    /// Execute the tool with the arguments the model supplied.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutput>;

    /// Where this tool came from.
    fn origin(&self) -> ToolOrigin {
        ToolOrigin::Native
    }

    /// The agent this tool consults, for sub-agent wrappers.
    fn sub_agent(&self) -> Option<&Arc<Agent>> {
        None
    }
}

/// Context provided to tools during execution.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Name of the agent whose turn invoked the tool
    pub agent: Option<String>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the calling agent.
    ///
    /// # Example
    /// ```
    /// use hermes::tools::ToolContext;
    ///
    /// let ctx = ToolContext::new().with_agent("Coordinator");
    /// assert_eq!(ctx.agent.as_deref(), Some("Coordinator"));
    /// ```
    pub fn with_agent(mut self, agent: &str) -> Self {
        self.agent = Some(agent.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_output_constructors() {
        let ok = ToolOutput::llm_only("4");
        assert_eq!(ok.for_llm, "4");
        assert!(!ok.is_error);

        let err = ToolOutput::error("Tool not found: x");
        assert!(err.is_error);
    }

    #[test]
    fn test_tool_origin_display_and_serde() {
        assert_eq!(ToolOrigin::SubAgent.to_string(), "sub_agent");
        assert_eq!(
            serde_json::to_string(&ToolOrigin::Native).unwrap(),
            "\"native\""
        );
    }

    #[test]
    fn test_tool_context_default() {
        assert!(ToolContext::default().agent.is_none());
    }
}
