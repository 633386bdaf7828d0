//! Credential discovery.
//!
//! Agents receive a [`CredentialLookup`] at construction and consult it only
//! when their own key string is empty. The lookup is the single place that
//! may touch the process environment.

use std::collections::HashMap;

use super::ProvidersConfig;

/// Resolves a provider's default credential string.
///
/// The returned string may hold several comma-separated keys.
pub trait CredentialLookup: Send + Sync {
    /// Credential for `provider`, or `None` when nothing is configured.
    fn lookup(&self, provider: &str) -> Option<String>;
}

/// Environment variable names tried, in order, for a known provider.
///
/// Unknown providers get an empty list; [`EnvCredentialLookup`] still tries
/// the generic `{PROVIDER}_API_KEY` afterwards.
pub fn provider_env_vars(provider: &str) -> &'static [&'static str] {
    match provider.trim().to_lowercase().as_str() {
        "openai" => &["OPENAI_API_KEY", "OPENAI_KEY", "OPEN_AI_KEY", "OPENAI_TOKEN"],
        "azure" => &[
            "AZURE_OPENAI_API_KEY",
            "AZURE_OPENAI_KEY",
            "AZURE_API_KEY",
            "AZURE_KEY",
        ],
        "anthropic" => &[
            "ANTHROPIC_API_KEY",
            "ANTHROPIC_KEY",
            "CLAUDE_API_KEY",
            "CLAUDE_KEY",
        ],
        "google" => &[
            "GOOGLE_API_KEY",
            "GOOGLE_KEY",
            "GEMINI_API_KEY",
            "GEMINI_KEY",
            "GOOGLE_AI_KEY",
        ],
        "gemini" => &["GEMINI_API_KEY", "GEMINI_KEY", "GOOGLE_API_KEY", "GOOGLE_KEY"],
        "cohere" => &["COHERE_API_KEY", "COHERE_KEY", "CO_API_KEY"],
        "huggingface" => &[
            "HUGGINGFACE_API_KEY",
            "HUGGINGFACE_TOKEN",
            "HF_API_KEY",
            "HF_TOKEN",
            "HUGGING_FACE_KEY",
        ],
        "replicate" => &["REPLICATE_API_KEY", "REPLICATE_TOKEN", "REPLICATE_KEY"],
        "together" => &["TOGETHER_API_KEY", "TOGETHER_KEY", "TOGETHERAI_KEY"],
        "mistral" => &["MISTRAL_API_KEY", "MISTRAL_KEY", "MISTRALAI_KEY"],
        "groq" => &["GROQ_API_KEY", "GROQ_KEY"],
        "perplexity" => &["PERPLEXITY_API_KEY", "PERPLEXITY_KEY", "PPLX_API_KEY"],
        "deepseek" => &["DEEPSEEK_API_KEY", "DEEPSEEK_KEY"],
        _ => &[],
    }
}

/// Reads credentials from environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialLookup;

impl EnvCredentialLookup {
    fn read(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

impl CredentialLookup for EnvCredentialLookup {
    fn lookup(&self, provider: &str) -> Option<String> {
        provider_env_vars(provider)
            .iter()
            .find_map(|name| Self::read(name))
            .or_else(|| Self::read(&format!("{}_API_KEY", provider.trim().to_uppercase())))
    }
}

/// Fixed provider -> credential table, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    keys: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential string for `provider`.
    ///
    /// # Example
    /// ```
    /// use hermes::config::{CredentialLookup, StaticCredentials};
    ///
    /// let creds = StaticCredentials::new().with("OpenAI", "sk-a,sk-b");
    /// assert_eq!(creds.lookup("openai").as_deref(), Some("sk-a,sk-b"));
    /// assert!(creds.lookup("groq").is_none());
    /// ```
    pub fn with(mut self, provider: &str, credential: &str) -> Self {
        self.keys
            .insert(provider.to_lowercase(), credential.to_string());
        self
    }
}

impl CredentialLookup for StaticCredentials {
    fn lookup(&self, provider: &str) -> Option<String> {
        self.keys.get(&provider.to_lowercase()).cloned()
    }
}

/// Provider config first, then a fallback lookup (normally the environment).
pub struct ConfigCredentialLookup<'a, F: CredentialLookup> {
    providers: &'a ProvidersConfig,
    fallback: F,
}

impl<'a, F: CredentialLookup> ConfigCredentialLookup<'a, F> {
    pub fn new(providers: &'a ProvidersConfig, fallback: F) -> Self {
        Self {
            providers,
            fallback,
        }
    }
}

impl<F: CredentialLookup> CredentialLookup for ConfigCredentialLookup<'_, F> {
    fn lookup(&self, provider: &str) -> Option<String> {
        self.providers
            .api_key(provider)
            .map(str::to_string)
            .or_else(|| self.fallback.lookup(provider))
    }
}
