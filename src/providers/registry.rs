//! Provider registry: the model capability factory.
//!
//! Maps a provider name to a factory that turns a [`BindingRequest`] into a
//! [`ModelBinding`]. Providers are resolved through this table only; an
//! unknown name is a configuration error rather than a runtime lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::agent::{BindingRequest, ModelBinding};
use crate::error::{HermesError, Result};

use super::openai::{OpenAIProvider, OPENAI_API_URL};

/// Metadata describing a known LLM provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Provider id as written in configuration (lowercase).
    pub name: &'static str,
    /// Default base URL for OpenAI-compatible providers.
    pub api_base: Option<&'static str>,
    /// Whether a backend for this provider is compiled in.
    pub runtime_supported: bool,
}

/// Every provider Hermes recognizes, in documentation order.
pub const PROVIDER_REGISTRY: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        api_base: Some(OPENAI_API_URL),
        runtime_supported: true,
    },
    ProviderSpec {
        name: "azure",
        api_base: None,
        runtime_supported: true,
    },
    ProviderSpec {
        name: "groq",
        api_base: Some("https://api.groq.com/openai/v1"),
        runtime_supported: true,
    },
    ProviderSpec {
        name: "together",
        api_base: Some("https://api.together.xyz/v1"),
        runtime_supported: true,
    },
    ProviderSpec {
        name: "mistral",
        api_base: Some("https://api.mistral.ai/v1"),
        runtime_supported: true,
    },
    ProviderSpec {
        name: "perplexity",
        api_base: Some("https://api.perplexity.ai"),
        runtime_supported: true,
    },
    ProviderSpec {
        name: "deepseek",
        api_base: Some("https://api.deepseek.com/v1"),
        runtime_supported: true,
    },
    ProviderSpec {
        name: "anthropic",
        api_base: None,
        runtime_supported: false,
    },
    ProviderSpec {
        name: "google",
        api_base: None,
        runtime_supported: false,
    },
    ProviderSpec {
        name: "gemini",
        api_base: None,
        runtime_supported: false,
    },
    ProviderSpec {
        name: "cohere",
        api_base: None,
        runtime_supported: false,
    },
    ProviderSpec {
        name: "huggingface",
        api_base: None,
        runtime_supported: false,
    },
    ProviderSpec {
        name: "replicate",
        api_base: None,
        runtime_supported: false,
    },
];

/// Look up a provider spec by (case-insensitive) name.
pub fn provider_spec(name: &str) -> Option<&'static ProviderSpec> {
    let name = name.to_lowercase();
    PROVIDER_REGISTRY.iter().find(|spec| spec.name == name)
}

/// A function building a binding for one credential.
pub type BindingFactory = Arc<dyn Fn(&BindingRequest) -> Result<ModelBinding> + Send + Sync>;

/// Provider name -> binding factory table.
///
/// # Example
/// ```
/// use hermes::agent::BindingRequest;
/// use hermes::providers::ProviderRegistry;
///
/// let registry = ProviderRegistry::with_defaults();
/// let request = BindingRequest {
///     provider: "OpenAI".into(),
///     model: "gpt-4o-mini".into(),
///     credential: "sk-test".into(),
///     temperature: 0.7,
///     api_base: None,
/// };
/// let binding = registry.resolve(&request).unwrap();
/// assert_eq!(binding.model(), "gpt-4o-mini");
/// ```
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, BindingFactory>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every compiled-in backend registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for spec in PROVIDER_REGISTRY.iter().filter(|s| s.runtime_supported) {
            let spec = *spec;
            registry.register(spec.name, move |request: &BindingRequest| {
                openai_compatible_binding(&spec, request)
            });
        }
        registry
    }

    /// Register (or replace) the factory for a provider name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&BindingRequest) -> Result<ModelBinding> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_lowercase(), Arc::new(factory));
    }

    /// Whether a factory is registered for `name`.
    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build a binding for the request.
    ///
    /// Fails with `BackendUnavailable` for recognized providers without a
    /// registered backend and with `Config` for unrecognized names.
    pub fn resolve(&self, request: &BindingRequest) -> Result<ModelBinding> {
        let name = request.provider.to_lowercase();
        if let Some(factory) = self.factories.get(&name) {
            debug!(provider = %name, model = %request.model, "Resolving model binding");
            return factory(request);
        }

        match provider_spec(&name) {
            Some(_) => Err(HermesError::BackendUnavailable {
                provider: name,
                reason: "no backend for this provider is compiled in".to_string(),
            }),
            None => Err(HermesError::Config(format!(
                "Unsupported provider: {}",
                request.provider
            ))),
        }
    }
}

fn openai_compatible_binding(spec: &ProviderSpec, request: &BindingRequest) -> Result<ModelBinding> {
    let api_base = request
        .api_base
        .as_deref()
        .filter(|base| !base.is_empty())
        .or(spec.api_base)
        .ok_or_else(|| {
            HermesError::Config(format!(
                "Provider '{}' requires an api_base (e.g. providers.{}.api_base)",
                spec.name, spec.name
            ))
        })?;

    let provider = OpenAIProvider::compatible(spec.name, &request.credential, api_base)
        .with_default_model(&request.model);
    Ok(ModelBinding::new(
        Arc::new(provider),
        &request.model,
        request.temperature,
    ))
}
