//! Sub-agent wrappers: agents exposed as tools to other agents.
//!
//! An [`AgentTool`] lets a parent's model consult a specialist. The parent's
//! tool step waits synchronously for the child's full asynchronous turn, so
//! every consultation runs in an isolated run-to-completion context (a fresh
//! OS thread driving its own current-thread runtime) rather than re-entering
//! the parent's executor. Child failures never escape the wrapper; they come
//! back to the parent's model as `"Error consulting {name}: ..."` text.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::agent::Agent;
use crate::error::{HermesError, Result};
use crate::utils::string::preview;

use super::function::query_schema;
use super::{Tool, ToolContext, ToolOrigin, ToolOutput};

/// Tool name under which an agent is consulted: `consult_` followed by the
/// lowercased name with spaces replaced by underscores.
///
/// # Example
/// ```
/// use hermes::tools::consult_tool_name;
///
/// assert_eq!(consult_tool_name("Market Analyst"), "consult_market_analyst");
/// ```
pub fn consult_tool_name(agent_name: &str) -> String {
    format!("consult_{}", agent_name.to_lowercase().replace(' ', "_"))
}

/// Run a future to completion on a fresh thread with its own runtime,
/// blocking the caller until it settles.
///
/// The future is built inside the new thread, so it never touches the
/// caller's executor. Safe to call from inside another isolated run: each
/// level gets its own thread and runtime.
pub fn block_on_isolated<F, Fut, T>(make: F) -> Result<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T>,
    T: Send + 'static,
{
    let handle = std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| HermesError::Tool(format!("Failed to create tokio runtime: {}", e)))?;
        Ok::<_, HermesError>(rt.block_on(make()))
    });
    handle
        .join()
        .map_err(|_| HermesError::Tool("Sub-agent thread panicked".to_string()))?
}

/// Wraps an [`Agent`] as a tool for another agent.
#[derive(Clone)]
pub struct AgentTool {
    agent: Arc<Agent>,
    name: String,
    description: String,
}

impl AgentTool {
    /// Wrap `agent`. The wrapper shares the agent; it does not own its
    /// lifetime exclusively.
    pub fn new(agent: Arc<Agent>) -> Self {
        let name = consult_tool_name(agent.name());
        let description = format!(
            "Consults the specialized agent '{name}'.\n\n\
             Agent Description: {description}\n\n\
             Args:\n    query: The question or task to be processed by this specialist\n\n\
             Returns:\n    Detailed response from {name}",
            name = agent.name(),
            description = agent.description(),
        );
        Self {
            agent,
            name,
            description,
        }
    }

    /// The wrapped agent.
    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    /// Run the child's turn, blocking the calling thread until it finishes.
    ///
    /// Only called from the blocking pool by [`Tool::execute`].
    fn try_consult(&self, query: &str) -> Result<String> {
        let agent = Arc::clone(&self.agent);
        let child = self.agent.name();
        let query = query.to_string();

        info!(agent = %child, query = %preview(&query, 80), "Consulting sub-agent");
        let start = Instant::now();

        let outcome = block_on_isolated(move || async move { agent.execute(&query, None).await })
            .and_then(|result| result);

        match outcome {
            Ok(response) => {
                info!(
                    agent = %child,
                    result_len = response.content.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Sub-agent completed"
                );
                Ok(response.to_string())
            }
            Err(e) => {
                warn!(agent = %child, error = %e, "Sub-agent failed");
                Err(e)
            }
        }
    }

    fn diagnostic(&self, error: &str) -> String {
        format!("Error consulting {}: {}", self.agent.name(), error)
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("agent", &self.agent.name())
            .finish()
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<ToolOutput> {
        let query = match args.get("query").and_then(Value::as_str) {
            Some(q) => q.to_string(),
            None => return Ok(ToolOutput::error(self.diagnostic("missing 'query' argument"))),
        };

        let wrapper = self.clone();
        let output = match tokio::task::spawn_blocking(move || wrapper.try_consult(&query)).await {
            Ok(Ok(answer)) => ToolOutput::llm_only(answer),
            Ok(Err(e)) => ToolOutput::error(self.diagnostic(&e.to_string())),
            Err(e) => ToolOutput::error(self.diagnostic(&e.to_string())),
        };
        Ok(output)
    }

    fn origin(&self) -> ToolOrigin {
        ToolOrigin::SubAgent
    }

    fn sub_agent(&self) -> Option<&Arc<Agent>> {
        Some(&self.agent)
    }
}
