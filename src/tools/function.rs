//! Native function tools.
//!
//! Wraps a plain Rust closure as a catalog entry. The closure receives the
//! model's JSON arguments and returns text.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{HermesError, Result};

use super::{Tool, ToolContext, ToolOutput};

type Handler = Arc<dyn Fn(Value) -> Result<String> + Send + Sync>;

/// A tool backed by a synchronous closure.
#[derive(Clone)]
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
    handler: Handler,
}

impl FunctionTool {
    /// Wrap a closure taking the raw JSON arguments.
    ///
    /// An empty `description` defaults to `"Tool for {name}"`.
    ///
    /// # Example
    /// ```
    /// use hermes::tools::FunctionTool;
    /// use serde_json::json;
    ///
    /// let tool = FunctionTool::new(
    ///     "calculate_investment",
    ///     "",
    ///     json!({
    ///         "type": "object",
    ///         "properties": {
    ///             "amount": {"type": "number"},
    ///             "period": {"type": "integer"}
    ///         },
    ///         "required": ["amount", "period"]
    ///     }),
    ///     |args| {
    ///         let amount = args["amount"].as_f64().unwrap_or(0.0);
    ///         let months = args["period"].as_f64().unwrap_or(0.0);
    ///         Ok(format!("{:.2}", amount * 1.12f64.powf(months / 12.0)))
    ///     },
    /// );
    /// assert_eq!(tool.description_text(), "Tool for calculate_investment");
    /// ```
    pub fn new<F>(name: &str, description: &str, parameters: Value, handler: F) -> Self
    where
        F: Fn(Value) -> Result<String> + Send + Sync + 'static,
    {
        let description = if description.trim().is_empty() {
            format!("Tool for {}", name)
        } else {
            description.to_string()
        };
        Self {
            name: name.to_string(),
            description,
            parameters,
            handler: Arc::new(handler),
        }
    }

    /// Wrap a closure taking a single text query.
    ///
    /// The generated schema has one required string parameter, `query`.
    pub fn query<F>(name: &str, description: &str, handler: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::new(name, description, query_schema(), move |args: Value| {
            let query = args
                .get("query")
                .and_then(Value::as_str)
                .ok_or_else(|| HermesError::Tool("Missing 'query' argument".to_string()))?;
            Ok(handler(query))
        })
    }

    /// The description as it will appear in the catalog.
    pub fn description_text(&self) -> &str {
        &self.description
    }
}

/// JSON schema of a tool taking one string `query`.
pub(crate) fn query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The question or task to be processed"
            }
        },
        "required": ["query"]
    })
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<ToolOutput> {
        (self.handler)(args).map(ToolOutput::llm_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_tool_executes() {
        let tool = FunctionTool::query("get_market_info", "Market updates", |q| {
            format!("market is up ({})", q)
        });
        let out = tool
            .execute(json!({"query": "ibov"}), &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(out.for_llm, "market is up (ibov)");
        assert_eq!(tool.origin(), crate::tools::ToolOrigin::Native);
    }

    #[tokio::test]
    async fn test_query_tool_missing_argument() {
        let tool = FunctionTool::query("t", "d", |q| q.to_string());
        let err = tool.execute(json!({}), &ToolContext::new()).await.unwrap_err();
        assert!(err.to_string().contains("Missing 'query'"));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let tool = FunctionTool::new("fails", "always fails", json!({}), |_| {
            Err(HermesError::Tool("boom".into()))
        });
        assert!(tool.execute(json!({}), &ToolContext::new()).await.is_err());
    }

    #[test]
    fn test_default_description() {
        let tool = FunctionTool::query("lookup", "  ", |q| q.to_string());
        assert_eq!(tool.description(), "Tool for lookup");
        assert_eq!(tool.parameters()["required"][0], "query");
    }
}
