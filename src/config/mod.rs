//! Configuration management for Hermes
//!
//! Configuration is loaded from `~/.hermes/config.json` with environment
//! variable overrides. Credential discovery lives in [`credentials`] and is
//! handed to agent construction explicitly; nothing below the binary reads
//! provider keys from the process environment on its own.

pub mod credentials;
mod types;

pub use credentials::{
    provider_env_vars, ConfigCredentialLookup, CredentialLookup, EnvCredentialLookup,
    StaticCredentials,
};
pub use types::*;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Prefix of every environment override.
const ENV_PREFIX: &str = "HERMES_";

impl Config {
    /// Returns the Hermes configuration directory path (~/.hermes)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hermes")
    }

    /// Returns the path to the config file (~/.hermes/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config: Config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.providers.normalize();
        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables follow the pattern: HERMES_SECTION_SUBSECTION_KEY
    fn apply_env_overrides(&mut self) {
        let defaults = &mut self.agents.defaults;
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_PROVIDER") {
            defaults.provider = val;
        }
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_MODEL") {
            defaults.model = val;
        }
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_TEMPERATURE") {
            if let Ok(v) = val.parse() {
                defaults.temperature = v;
            }
        }
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_MAX_HISTORY_LENGTH") {
            if let Ok(v) = val.parse() {
                defaults.max_history_length = v;
            }
        }
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_TOKEN_LIMIT") {
            if let Ok(v) = val.parse() {
                defaults.token_limit = v;
            }
        }
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_MAX_TOOL_ITERATIONS") {
            if let Ok(v) = val.parse() {
                defaults.max_tool_iterations = v;
            }
        }
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_MAX_TOKENS") {
            if let Ok(v) = val.parse() {
                defaults.max_tokens = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_ENHANCE_INPUT") {
            if let Ok(v) = val.parse() {
                defaults.enhance_input = v;
            }
        }
        if let Ok(val) = std::env::var("HERMES_AGENTS_DEFAULTS_DEBUG") {
            if let Ok(v) = val.parse() {
                defaults.debug = v;
            }
        }

        if let Ok(val) = std::env::var("HERMES_TEAM_MAX_DEPTH") {
            if let Ok(v) = val.parse() {
                self.team.max_depth = v;
            }
        }

        if let Ok(val) = std::env::var("HERMES_LOG_LEVEL") {
            self.logging.level = val;
        }

        self.apply_provider_env_overrides();
    }

    /// Apply `HERMES_PROVIDERS_<NAME>_API_KEY` / `_API_BASE` overrides for
    /// every provider in the registry.
    fn apply_provider_env_overrides(&mut self) {
        for spec in crate::providers::PROVIDER_REGISTRY {
            let upper = spec.name.to_uppercase();
            if let Ok(val) =
                std::env::var(format!("{}PROVIDERS_{}_API_KEY", ENV_PREFIX, upper))
            {
                self.providers.entry(spec.name).api_key = Some(val);
            }
            if let Ok(val) =
                std::env::var(format!("{}PROVIDERS_{}_API_BASE", ENV_PREFIX, upper))
            {
                self.providers.entry(spec.name).api_base = Some(val);
            }
        }
    }

    /// Find an agent spec by name (case-insensitive).
    pub fn agent_spec(&self, name: &str) -> Option<&AgentSpec> {
        self.team
            .agents
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.agents.defaults.provider, "openai");
        assert_eq!(config.agents.defaults.temperature, 0.7);
        assert_eq!(config.agents.defaults.max_history_length, 20);
        assert_eq!(config.agents.defaults.token_limit, 4000);
        assert!(config.agents.defaults.enhance_input);
        assert!(!config.agents.defaults.debug);
        assert_eq!(config.team.max_depth, 8);
        assert!(config.team.agents.is_empty());
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{"agents": {"defaults": {"model": "gpt-4o"}}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.agents.defaults.model, "gpt-4o");
        assert_eq!(config.agents.defaults.max_history_length, 20);
    }

    #[test]
    fn test_team_from_json() {
        let json = r#"{
            "team": {
                "agents": [
                    {"name": "Analyst", "description": "Markets", "prompt": "Be precise."},
                    {"name": "Coordinator", "consults": ["Analyst"], "temperature": 0.5}
                ]
            }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.team.agents.len(), 2);
        assert_eq!(config.team.max_depth, 8);
        let coordinator = config.agent_spec("coordinator").unwrap();
        assert_eq!(coordinator.consults, vec!["Analyst".to_string()]);
        assert_eq!(coordinator.temperature, Some(0.5));
        assert!(coordinator.provider.is_none());
    }

    #[test]
    fn test_provider_configs() {
        let json = r#"{
            "providers": {
                "openai": {"api_key": "sk-1, sk-2"},
                "Azure": {"api_key": "az", "api_base": "https://x.openai.azure.com/openai/v1"}
            }
        }"#;
        let mut config: Config = serde_json::from_str(json).unwrap();
        config.providers.normalize();
        assert_eq!(config.providers.api_key("openai"), Some("sk-1, sk-2"));
        assert_eq!(
            config.providers.api_base("azure"),
            Some("https://x.openai.azure.com/openai/v1")
        );
        assert!(config.providers.api_key("groq").is_none());
    }

    #[test]
    fn test_blank_api_key_treated_as_missing() {
        let mut config = Config::default();
        config.providers.entry("openai").api_key = Some("  ".to_string());
        assert!(config.providers.api_key("openai").is_none());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.agents.defaults.token_limit, 4000);
    }

    #[test]
    fn test_load_team_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"team": {"agents": [{"name": "Solo"}]}}"#).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.team.agents[0].name, "Solo");
        assert!(loaded.agent_spec("solo").is_some());
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn test_env_override() {
        env::set_var("HERMES_AGENTS_DEFAULTS_MODEL", "test-model");
        env::set_var("HERMES_AGENTS_DEFAULTS_TOKEN_LIMIT", "1234");
        env::set_var("HERMES_PROVIDERS_DEEPSEEK_API_KEY", "ds-key");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.agents.defaults.model, "test-model");
        assert_eq!(config.agents.defaults.token_limit, 1234);
        assert_eq!(config.providers.api_key("deepseek"), Some("ds-key"));

        env::remove_var("HERMES_AGENTS_DEFAULTS_MODEL");
        env::remove_var("HERMES_AGENTS_DEFAULTS_TOKEN_LIMIT");
        env::remove_var("HERMES_PROVIDERS_DEEPSEEK_API_KEY");
    }

    #[test]
    fn test_config_dir_and_path() {
        assert!(Config::dir().ends_with(".hermes"));
        assert!(Config::path().ends_with("config.json"));
    }
}
