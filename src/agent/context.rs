//! System prompt composition for agents
//!
//! This module provides the `PromptComposer`, which renders an agent's
//! system prompt from its identity, behavioral instructions, a fixed
//! reasoning and response scaffold, the current time, and the tool catalog.
//! Time comes from an injected [`Clock`] so rendering is reproducible in
//! tests.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::tools::ToolRegistry;
use crate::utils::string::indent_block;

/// Timestamp format embedded in the prompt.
pub const PROMPT_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Indentation applied to the rendered template.
const TEMPLATE_INDENT: usize = 4;

/// Source of the "current time" embedded in prompts.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use hermes::agent::{Clock, FixedClock};
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 30, 0).unwrap();
/// assert_eq!(FixedClock::new(at).now(), at);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// The default clock shared by agents that don't inject one.
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// A catalog line: tool name and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
}

impl CatalogEntry {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Catalog lines for every tool in a registry, in catalog order.
pub fn catalog_of(registry: &ToolRegistry) -> Vec<CatalogEntry> {
    registry
        .iter()
        .map(|tool| CatalogEntry::new(tool.name(), tool.description()))
        .collect()
}

/// Renders agent system prompts.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use hermes::agent::{CatalogEntry, FixedClock, PromptComposer};
///
/// let clock = FixedClock::new(
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 30, 0).unwrap(),
/// );
/// let composer = PromptComposer::new("Analyst", "Reads markets", "Be brief.");
/// let prompt = composer.render(&[CatalogEntry::new("get_quote", "Latest quote")], &clock);
///
/// assert!(prompt.contains("Your name is: 'Analyst'"));
/// assert!(prompt.contains("01/03/2024 09:30:00"));
/// assert!(prompt.ends_with("1. get_quote: Latest quote\n"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptComposer {
    name: String,
    description: String,
    instructions: String,
}

impl PromptComposer {
    pub fn new(name: &str, description: &str, instructions: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            instructions: instructions.to_string(),
        }
    }

    /// Render the full system prompt.
    ///
    /// Identical inputs and clock reading give byte-identical output.
    pub fn render(&self, catalog: &[CatalogEntry], clock: &dyn Clock) -> String {
        let timestamp = clock.now().format(PROMPT_TIME_FORMAT);
        let template = format!(
            "
# Identity (Agent Profile):
Your name is: '{name}'
Your description is: '{description}'

# Instructions (Behavior Guidelines):
{instructions}

# Thinking Process (Chain of Thought):
1. First, analyze the user's query carefully to understand the intent and context
2. Break down complex problems into smaller, manageable steps
3. Consider available tools and resources that could help solve this problem
4. Evaluate different approaches before selecting the best one
5. Explain your reasoning step by step when appropriate
6. Verify your solution makes sense before providing the final answer

# Response Structure (How to Reply):
- For complex queries: Show your thinking process before giving the final answer
- For simple queries: Provide a direct response with optional brief explanation
- Always maintain a helpful and professional tone

# Current date and time (for context): 
{timestamp}
",
            name = self.name,
            description = self.description,
            instructions = self.instructions,
            timestamp = timestamp,
        );

        let mut prompt = indent_block(&template, TEMPLATE_INDENT);

        if !catalog.is_empty() {
            prompt.push_str("\n# Available tools (to assist you):\n");
            for (idx, entry) in catalog.iter().enumerate() {
                let _ = writeln!(prompt, "{}. {}: {}", idx + 1, entry.name, entry.description);
            }
        }

        prompt
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
