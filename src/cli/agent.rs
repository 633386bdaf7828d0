//! Agent command handlers: one-shot questions and prompt inspection.

use std::path::Path;

use anyhow::Result;

use hermes::Config;

use super::common::{load_team, read_history};

/// Ask one agent one question and print the answer.
///
/// Turn failures are printed as text; construction failures are errors.
pub(crate) async fn cmd_ask(
    config: &Config,
    agent_name: &str,
    history: Option<&Path>,
    message: &str,
) -> Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message must not be empty");
    }

    let team = load_team(config)?;
    let agent = team.get(agent_name)?;
    let history = match history {
        Some(path) => Some(read_history(path)?),
        None => None,
    };

    let answer = agent.reply(message, history.as_deref()).await;
    println!("{}", answer);
    Ok(())
}

/// Print an agent's current system prompt.
pub(crate) fn cmd_prompt(config: &Config, agent_name: &str) -> Result<()> {
    let team = load_team(config)?;
    let agent = team.get(agent_name)?;
    println!("{}", agent.system_prompt());
    Ok(())
}
