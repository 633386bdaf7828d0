//! Hermes - Composable LLM agents
//!
//! Agents wrap a model endpoint, a tool catalog and conversation memory.
//! Agents can be tools of other agents, so a coordinator can consult
//! specialists; credentials rotate per turn across a key pool.

pub mod agent;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod team;
pub mod tools;
pub mod utils;

pub use agent::{Agent, AgentBuilder, AgentResponse, KeyPool, MemoryBuffer, ModelBinding};
pub use config::Config;
pub use error::{HermesError, ProviderError, Result};
pub use providers::{
    ChatOptions, LLMProvider, LLMResponse, LLMToolCall, OpenAIProvider, ProviderRegistry,
    ToolDefinition, Usage,
};
pub use session::{Message, Role, ToolCall};
pub use team::{build_team, Team};
pub use tools::{AgentTool, FunctionTool, Tool, ToolRegistry, ToolSource};
