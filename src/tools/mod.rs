//! Tools module - Tool catalog and execution for LLM function calling
//!
//! An agent's catalog mixes native functions with other agents. Both end up
//! behind the same [`Tool`] trait so the model sees one uniform list.
//!
//! # Overview
//!
//! - `Tool` trait: The interface every catalog entry implements
//! - `FunctionTool`: A synchronous Rust closure exposed to the model
//! - `AgentTool`: A nested agent consulted through `consult_{name}`
//! - `ToolRegistry`: Insertion-ordered catalog that normalizes `ToolSource`s
//!
//! # Example
//!
//! ```rust
//! use hermes::tools::{FunctionTool, ToolRegistry, ToolSource};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let registry = ToolRegistry::from_sources(vec![
//!     ToolSource::from(FunctionTool::query("get_market_info", "Market updates", |_| {
//!         "IBOV up 1.2%".to_string()
//!     })),
//! ]);
//!
//! let result = registry
//!     .execute("get_market_info", json!({"query": "today"}))
//!     .await
//!     .unwrap();
//! assert_eq!(result.for_llm, "IBOV up 1.2%");
//! assert_eq!(registry.definitions().len(), 1);
//! # });
//! ```

mod consult;
mod function;
mod registry;
mod types;

pub use consult::{block_on_isolated, consult_tool_name, AgentTool};
pub use function::FunctionTool;
pub use registry::{ToolRegistry, ToolSource};
pub use types::{Tool, ToolContext, ToolOrigin, ToolOutput};
