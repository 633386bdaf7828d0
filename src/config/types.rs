//! Configuration type definitions for Hermes
//!
//! All types implement serde traits for JSON serialization and have sensible
//! defaults, so a partial (or missing) config file is always valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration struct for Hermes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent defaults shared by every team member
    pub agents: AgentConfig,
    /// LLM provider configurations keyed by provider name
    pub providers: ProvidersConfig,
    /// Declarative agent hierarchy
    pub team: TeamConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

// ============================================================================
// Agent Configuration
// ============================================================================

/// Agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Defaults applied when an agent spec leaves a field unset
    pub defaults: AgentDefaults,
}

/// Default agent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDefaults {
    /// Default provider name
    pub provider: String,
    /// Default model to use
    pub model: String,
    /// Sampling temperature, clamped to `[0, 1]` at build time
    pub temperature: f32,
    /// Maximum number of history entries sent with a turn
    pub max_history_length: usize,
    /// Token budget above which history is summarized
    pub token_limit: usize,
    /// Maximum tool round trips per turn
    pub max_tool_iterations: u32,
    /// Maximum tokens for responses (provider default when unset)
    pub max_tokens: Option<u32>,
    /// Whether to decorate user input with extracted keywords
    pub enhance_input: bool,
    /// Emit memory snapshots and enhanced input at debug level
    pub debug: bool,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_history_length: 20,
            token_limit: 4000,
            max_tool_iterations: 10,
            max_tokens: None,
            enhance_input: true,
            debug: false,
        }
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// LLM provider configurations keyed by lowercase provider name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvidersConfig {
    entries: BTreeMap<String, ProviderConfig>,
}

impl ProvidersConfig {
    /// Look up a provider's settings.
    pub fn get(&self, name: &str) -> Option<&ProviderConfig> {
        self.entries.get(&name.to_lowercase())
    }

    /// Mutable access, inserting defaults if the provider is absent.
    pub fn entry(&mut self, name: &str) -> &mut ProviderConfig {
        self.entries.entry(name.to_lowercase()).or_default()
    }

    /// Lowercase provider keys as written in a config file.
    pub(crate) fn normalize(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .map(|(name, cfg)| (name.to_lowercase(), cfg))
            .collect();
    }

    /// Configured provider names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The provider's API key, if set and non-empty.
    pub fn api_key(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    /// The provider's base URL override, if set and non-empty.
    pub fn api_base(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|p| p.api_base.as_deref())
            .filter(|b| !b.is_empty())
    }
}

/// Configuration for a single LLM provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key, or several separated by commas to form a rotation pool
    pub api_key: Option<String>,
    /// Base URL for OpenAI-compatible endpoints
    pub api_base: Option<String>,
}

// ============================================================================
// Team Configuration
// ============================================================================

/// Declarative agent hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Maximum nesting of agents consulting agents
    pub max_depth: usize,
    /// Agent definitions; `consults` entries refer to other agents by name
    pub agents: Vec<AgentSpec>,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            agents: Vec::new(),
        }
    }
}

/// One agent in the team. Unset fields fall back to [`AgentDefaults`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpec {
    /// Display name; also determines the `consult_*` tool name
    pub name: String,
    /// What the agent is for; shown to parents that consult it
    pub description: String,
    /// Behavior instructions embedded in the system prompt
    pub prompt: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Comma-separated credential pool; falls back to provider config, then env
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_history_length: Option<usize>,
    pub token_limit: Option<usize>,
    /// Names of agents this agent may consult as tools
    pub consults: Vec<String>,
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line text output
    #[default]
    Compact,
    /// JSON lines for log aggregators
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "hermes=debug")
    pub level: String,
    pub format: LogFormat,
    /// Append logs to this file instead of stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}
