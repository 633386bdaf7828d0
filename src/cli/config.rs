//! Config check command handler.

use anyhow::Result;

use hermes::tools::ToolOrigin;
use hermes::Config;

use super::common::load_team;

/// Build the configured team and report each agent's catalog.
///
/// Configuration and composition errors surface as a non-zero exit.
pub(crate) fn cmd_check(config: &Config) -> Result<()> {
    let team = load_team(config)?;

    for (name, agent) in team.iter() {
        println!(
            "{} ({} / {}, temperature {:.2}, {} key(s), depth {})",
            name,
            agent.provider_name(),
            agent.binding().model(),
            agent.temperature(),
            agent.keys().len(),
            agent.composition_depth()
        );
        if agent.tools().is_empty() {
            println!("  (no tools)");
        }
        for tool in agent.tools().iter() {
            let marker = match tool.origin() {
                ToolOrigin::SubAgent => "agent",
                ToolOrigin::Native => "fn",
            };
            println!("  [{}] {}", marker, tool.name());
        }
    }

    println!("\n[OK] {} agent(s) built", team.len());
    Ok(())
}
