//! Logging initialization for Hermes.
//!
//! Supports three formats:
//! - `pretty`: multi-line human-readable output
//! - `compact`: `timestamp LEVEL target: message fields`, grep-friendly
//! - `json`: structured JSON lines for log aggregators

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::Result;

use super::string::{prefix_chars, suffix_chars};

/// Initialize the global tracing subscriber from config.
///
/// Call this once at startup before any tracing events are emitted.
/// Falls back to `RUST_LOG` env var; if unset, uses `cfg.level`. A second
/// call is a no-op.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match (&cfg.file, cfg.format) {
        (Some(path), format) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let builder = builder.with_writer(Mutex::new(file)).with_ansi(false);
            match format {
                LogFormat::Json => builder.json().try_init(),
                LogFormat::Pretty => builder.pretty().try_init(),
                LogFormat::Compact => builder.compact().try_init(),
            }
        }
        (None, format) => {
            // stdout carries command output
            let builder = builder.with_writer(std::io::stderr);
            match format {
                LogFormat::Json => builder.json().try_init(),
                LogFormat::Pretty => builder.pretty().try_init(),
                LogFormat::Compact => builder.compact().try_init(),
            }
        }
    };

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already installed");
    }
    Ok(())
}

/// Mask a credential for display: first 8 and last 4 characters when it is
/// longer than 12 characters, `***` otherwise.
///
/// # Example
/// ```
/// use hermes::utils::logging::mask_credential;
///
/// assert_eq!(mask_credential("sk-1234567890abcdef"), "sk-12345...cdef");
/// assert_eq!(mask_credential("short"), "***");
/// ```
pub fn mask_credential(credential: &str) -> String {
    if credential.chars().count() > 12 {
        format!(
            "{}...{}",
            prefix_chars(credential, 8),
            suffix_chars(credential, 4)
        )
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.format, LogFormat::Compact);
        assert_eq!(cfg.level, "info");
        assert!(cfg.file.is_none());
    }

    #[test]
    fn test_log_format_deserialize() {
        let cfg: LoggingConfig =
            serde_json::from_str(r#"{"format":"json","level":"debug"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.level, "debug");

        let cfg: LoggingConfig = serde_json::from_str(r#"{"format":"pretty"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Pretty);
        assert_eq!(cfg.level, "info");
    }

    #[test]
    fn test_mask_credential_boundaries() {
        assert_eq!(mask_credential("123456789012"), "***");
        assert_eq!(mask_credential("1234567890123"), "12345678...0123");
        assert_eq!(mask_credential(""), "***");
    }

    #[test]
    fn test_init_logging_to_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
            file: Some(dir.path().join("hermes.log").display().to_string()),
        };
        assert!(init_logging(&cfg).is_ok());
        assert!(init_logging(&cfg).is_ok());
    }
}
