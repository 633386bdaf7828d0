//! Agent module - Core agent runtime
//!
//! This module provides everything one agent needs to run a turn:
//!
//! - Drawing a credential from its [`KeyPool`] and binding a model
//! - Rebuilding conversation memory from the caller's history, summarizing
//!   it when over budget and trimming it to a maximum length
//! - Rendering the system prompt with the tool catalog
//! - Calling the model and executing tool calls, including other agents
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │   KeyPool   │────>│    Agent    │────>│   ModelBinding   │
//! │ (per turn)  │     │             │     │ (LLMProvider +   │
//! └─────────────┘     └─────────────┘     │   Tokenizer)     │
//!                            │            └──────────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │MemoryBuffer │     │    Tools    │
//!                     │ + Summarizer│     │  Registry   │──> other Agents
//!                     └─────────────┘     └─────────────┘
//! ```

mod binding;
pub mod compaction;
mod context;
mod keys;
mod keywords;
mod r#loop;
mod memory;

pub use binding::{BindingRequest, ModelBinding};
pub use compaction::{LlmSummarizer, Summarizer};
pub use context::{
    catalog_of, system_clock, CatalogEntry, Clock, FixedClock, PromptComposer, SystemClock,
    PROMPT_TIME_FORMAT,
};
pub use keys::KeyPool;
pub use keywords::{enhance_input, FrequencyKeywordExtractor, KeywordExtractor, MAX_KEYWORDS};
pub use memory::MemoryBuffer;
pub use r#loop::{clamp_temperature, Agent, AgentBuilder, AgentResponse, DEFAULT_MAX_DEPTH};
