//! Tool registry for Hermes
//!
//! Normalizes heterogeneous inputs (plain functions, ready-made tools and
//! nested agents) into one insertion-ordered catalog, and executes tools by
//! name with timing logs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::agent::Agent;
use crate::error::Result;
use crate::providers::ToolDefinition;

use super::{AgentTool, FunctionTool, Tool, ToolContext, ToolOutput};

/// Anything that can become a catalog entry.
#[derive(Clone)]
pub enum ToolSource {
    /// A native closure.
    Function(FunctionTool),
    /// An already-normalized tool, passed through unchanged.
    Tool(Arc<dyn Tool>),
    /// A nested agent; wrapped in a synthesized [`AgentTool`].
    Agent(Arc<Agent>),
}

impl From<FunctionTool> for ToolSource {
    fn from(tool: FunctionTool) -> Self {
        ToolSource::Function(tool)
    }
}

impl From<Arc<dyn Tool>> for ToolSource {
    fn from(tool: Arc<dyn Tool>) -> Self {
        ToolSource::Tool(tool)
    }
}

impl From<Arc<Agent>> for ToolSource {
    fn from(agent: Arc<Agent>) -> Self {
        ToolSource::Agent(agent)
    }
}

impl From<AgentTool> for ToolSource {
    fn from(tool: AgentTool) -> Self {
        ToolSource::Tool(Arc::new(tool))
    }
}

impl ToolSource {
    /// Turn the source into a catalog entry.
    pub fn into_tool(self) -> Arc<dyn Tool> {
        match self {
            ToolSource::Function(f) => Arc::new(f),
            ToolSource::Tool(t) => t,
            ToolSource::Agent(agent) => Arc::new(AgentTool::new(agent)),
        }
    }
}

/// An insertion-ordered tool catalog.
///
/// Registering a name that already exists replaces the earlier tool in its
/// original slot, so lookup, definitions and the rendered prompt always agree
/// on a single tool per name.
///
/// # Example
///
/// ```rust
/// use hermes::tools::{FunctionTool, ToolRegistry};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let mut registry = ToolRegistry::new();
/// registry.register_source(FunctionTool::query("echo", "Echo the query", |q| q.to_string()).into());
///
/// assert!(registry.has("echo"));
/// let out = registry.execute("echo", json!({"query": "hello"})).await.unwrap();
/// assert_eq!(out.for_llm, "hello");
/// # });
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from mixed sources, in order.
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = ToolSource>,
    {
        let mut registry = Self::new();
        for source in sources {
            registry.register_source(source);
        }
        registry
    }

    /// Register a tool. A tool with the same name is replaced in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => {
                warn!(tool = %name, "Tool name already registered, replacing earlier tool");
                self.tools[slot] = tool;
            }
            None => {
                info!(tool = %name, origin = %tool.origin(), "Registering tool");
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Normalize and register one source.
    pub fn register_source(&mut self, source: ToolSource) {
        self.register(source.into_tool());
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// Check if a tool exists in the registry.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Tools in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Agents consulted by sub-agent wrappers in this catalog.
    pub fn sub_agents(&self) -> Vec<&Arc<Agent>> {
        self.tools.iter().filter_map(|t| t.sub_agent()).collect()
    }

    /// Tool definitions for LLM providers, in catalog order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.parameters()))
            .collect()
    }

    /// Execute a tool by name with default context.
    pub async fn execute(&self, name: &str, args: Value) -> Result<ToolOutput> {
        self.execute_with_context(name, args, &ToolContext::default())
            .await
    }

    /// Execute a tool by name with a specific context.
    ///
    /// Tool-not-found returns `Ok(ToolOutput::error(...))` so the model can
    /// recover; a failing tool returns its error.
    pub async fn execute_with_context(
        &self,
        name: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput> {
        let tool = match self.get(name) {
            Some(t) => t,
            None => {
                return Ok(ToolOutput::error(format!("Tool not found: {}", name)));
            }
        };

        let start = Instant::now();

        match tool.execute(args, ctx).await {
            Ok(output) => {
                info!(
                    tool = name,
                    is_error = output.is_error,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool executed"
                );
                Ok(output)
            }
            Err(e) => {
                error!(
                    tool = name,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool execution failed"
                );
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HermesError;
    use serde_json::json;

    fn echo(name: &str, prefix: &'static str) -> ToolSource {
        FunctionTool::query(name, "", move |q| format!("{}{}", prefix, q)).into()
    }

    #[test]
    fn test_registry_preserves_insertion_order() {
        let registry = ToolRegistry::from_sources(vec![
            echo("zeta", ""),
            echo("alpha", ""),
            echo("mid", ""),
        ]);
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        let defs = registry.definitions();
        assert_eq!(defs[0].name, "zeta");
        assert_eq!(defs[2].name, "mid");
    }

    #[tokio::test]
    async fn test_duplicate_name_replaces_in_place() {
        let registry = ToolRegistry::from_sources(vec![
            echo("first", "old:"),
            echo("second", ""),
            echo("first", "new:"),
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["first", "second"]);

        let out = registry.execute("first", json!({"query": "x"})).await.unwrap();
        assert_eq!(out.for_llm, "new:x");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let out = registry.execute("missing", json!({})).await.unwrap();
        assert!(out.is_error);
        assert_eq!(out.for_llm, "Tool not found: missing");
    }

    #[tokio::test]
    async fn test_execute_failing_tool_returns_err() {
        let mut registry = ToolRegistry::new();
        registry.register_source(
            FunctionTool::new("bad", "fails", json!({}), |_| {
                Err(HermesError::Tool("nope".into()))
            })
            .into(),
        );
        assert!(registry.execute("bad", json!({})).await.is_err());
    }

    #[test]
    fn test_passthrough_tool_unchanged() {
        let tool: Arc<dyn Tool> = Arc::new(FunctionTool::query("pass", "described", |q| q.into()));
        let registry = ToolRegistry::from_sources(vec![ToolSource::from(Arc::clone(&tool))]);
        assert!(Arc::ptr_eq(registry.get("pass").unwrap(), &tool));
        assert!(registry.sub_agents().is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.definitions().is_empty());
        assert!(!registry.has("x"));
    }
}
