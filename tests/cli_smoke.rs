//! CLI smoke tests - verify commands that work without network access.
//!
//! These tests run the compiled binary and verify exit codes and output.
//! Agents are built with dummy keys; building a team never calls a model.

use std::io::Write;
use std::process::Command;

/// Helper: run hermes with given args and return (exit_code, stdout, stderr).
fn run_cli(args: &[&str]) -> (i32, String, String) {
    let bin = env!("CARGO_BIN_EXE_hermes");
    let output = Command::new(bin)
        .args(args)
        .env("RUST_LOG", "") // suppress tracing noise
        .env_remove("OPENAI_API_KEY")
        .output()
        .expect("failed to execute hermes binary");
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

/// A config with two OpenAI agents, one consulting the other.
fn team_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "providers": {{ "openai": {{ "api_key": "sk-test-1,sk-test-2" }} }},
            "team": {{
                "agents": [
                    {{ "name": "Analyst", "description": "Crunches numbers", "prompt": "Use figures." }},
                    {{ "name": "Coordinator", "description": "Routes work", "consults": ["Analyst"] }}
                ]
            }}
        }}"#
    )
    .unwrap();
    file
}

// ============================================================================
// Help & Version
// ============================================================================

#[test]
fn cli_no_args_shows_help() {
    let (code, stdout, _stderr) = run_cli(&[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("hermes"));
}

#[test]
fn cli_help_flag() {
    let (code, stdout, _stderr) = run_cli(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("ask"));
    assert!(stdout.contains("check"));
}

#[test]
fn cli_version_command() {
    let (code, stdout, _stderr) = run_cli(&["version"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("hermes "));
    assert!(stdout.contains('.'));
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn cli_check_without_agents_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let (code, _stdout, stderr) = run_cli(&["check", "--config", missing.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("No agents configured"), "stderr: {}", stderr);
}

#[test]
fn cli_check_lists_team() {
    let config = team_config();
    let (code, stdout, stderr) = run_cli(&["check", "--config", config.path().to_str().unwrap()]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("Coordinator (openai / gpt-4o-mini"));
    assert!(stdout.contains("[agent] consult_analyst"));
    assert!(stdout.contains("2 key(s)"));
    assert!(stdout.contains("[OK] 2 agent(s) built"));
}

#[test]
fn cli_check_rejects_cycles() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "providers": {{ "openai": {{ "api_key": "sk-test" }} }},
            "team": {{ "agents": [
                {{ "name": "A", "consults": ["B"] }},
                {{ "name": "B", "consults": ["A"] }}
            ] }}
        }}"#
    )
    .unwrap();

    let (code, _stdout, stderr) = run_cli(&["check", "--config", file.path().to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("cycle"), "stderr: {}", stderr);
}

// ============================================================================
// Prompt & Ask
// ============================================================================

#[test]
fn cli_prompt_prints_system_prompt() {
    let config = team_config();
    let (code, stdout, _stderr) = run_cli(&[
        "prompt",
        "--agent",
        "Coordinator",
        "--config",
        config.path().to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Your name is: 'Coordinator'"));
    assert!(stdout.contains("# Available tools (to assist you):"));
    assert!(stdout.contains("1. consult_analyst:"));
}

#[test]
fn cli_prompt_unknown_agent_fails() {
    let config = team_config();
    let (code, _stdout, stderr) = run_cli(&[
        "prompt",
        "--agent",
        "Ghost",
        "--config",
        config.path().to_str().unwrap(),
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown agent 'Ghost'"));
}

#[test]
fn cli_ask_rejects_empty_message() {
    let config = team_config();
    let (code, _stdout, stderr) = run_cli(&[
        "ask",
        "--agent",
        "Analyst",
        "--config",
        config.path().to_str().unwrap(),
        "   ",
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Message must not be empty"));
}

#[test]
fn cli_ask_requires_agent() {
    let (code, _stdout, stderr) = run_cli(&["ask", "hello"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--agent"));
}
