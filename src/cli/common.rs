//! Shared CLI helpers used across multiple command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use hermes::config::{ConfigCredentialLookup, EnvCredentialLookup};
use hermes::providers::ProviderRegistry;
use hermes::session::Message;
use hermes::{build_team, Config, Team};

/// Load config from `path`, or the default location.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().with_context(|| "Failed to load config")?,
    };
    Ok(config)
}

/// Build every configured agent, resolving keys from provider config and
/// then the environment.
pub(crate) fn load_team(config: &Config) -> Result<Team> {
    if config.team.agents.is_empty() {
        anyhow::bail!(
            "No agents configured. Add a `team.agents` list to {}",
            Config::path().display()
        );
    }

    let providers = ProviderRegistry::with_defaults();
    let credentials = ConfigCredentialLookup::new(&config.providers, EnvCredentialLookup);
    let team = build_team(config, &providers, &credentials)?;
    info!(agents = ?team.names(), "Loaded team");
    Ok(team)
}

/// Read a conversation history file: a JSON array of messages.
pub(crate) fn read_history(path: &Path) -> Result<Vec<Message>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    let history: Vec<Message> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid history JSON in {}", path.display()))?;
    Ok(history)
}
