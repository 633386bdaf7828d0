//! CLI module: command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod agent;
pub mod common;
pub mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hermes")]
#[command(version)]
#[command(about = "Composable LLM agents that consult each other", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.hermes/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message to an agent and print its answer
    Ask {
        /// Agent to ask, by name
        #[arg(short, long)]
        agent: String,
        /// JSON file holding the conversation so far (a list of messages)
        #[arg(long)]
        history: Option<PathBuf>,
        /// The message
        message: String,
    },
    /// Build the configured team and print each agent's tools
    Check,
    /// Print an agent's rendered system prompt
    Prompt {
        /// Agent whose prompt to print
        #[arg(short, long)]
        agent: String,
    },
    /// Show version information
    Version,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = common::load_config(cli.config.as_deref())?;
    if let Err(e) = hermes::utils::logging::init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Version) => {
            println!("hermes {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Ask {
            agent,
            history,
            message,
        }) => {
            agent::cmd_ask(&config, &agent, history.as_deref(), &message).await?;
        }
        Some(Commands::Check) => {
            config::cmd_check(&config)?;
        }
        Some(Commands::Prompt { agent }) => {
            agent::cmd_prompt(&config, &agent)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["hermes", "ask", "--agent", "Coordinator", "2+2?"]).unwrap();
        match cli.command {
            Some(Commands::Ask { agent, message, history }) => {
                assert_eq!(agent, "Coordinator");
                assert_eq!(message, "2+2?");
                assert!(history.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["hermes", "check", "--config", "/tmp/h.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/h.json")));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
