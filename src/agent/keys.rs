//! Credential pools.
//!
//! A [`KeyPool`] holds the interchangeable API credentials an agent may draw
//! from. Selection is memoryless: every draw is an independent uniform
//! choice, so the pool carries no rotation state and is safe to share.

use rand::seq::IndexedRandom;
use tracing::debug;

use crate::config::credentials::CredentialLookup;
use crate::error::{HermesError, Result};

/// A non-empty set of credentials for one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPool {
    provider: String,
    keys: Vec<String>,
}

/// Split a comma-separated credential string into trimmed, non-empty parts.
fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

impl KeyPool {
    /// Build a pool from a comma-separated credential string.
    ///
    /// When `raw` holds no credentials, `lookup` is asked for the provider's
    /// default credential (which may itself be comma-separated). An empty pool
    /// after the fallback is a configuration error.
    ///
    /// # Example
    /// ```
    /// use hermes::agent::KeyPool;
    /// use hermes::config::credentials::StaticCredentials;
    ///
    /// let none = StaticCredentials::new();
    /// let pool = KeyPool::configure(" k1, k2 ,,k3 ", "openai", &none).unwrap();
    /// assert_eq!(pool.keys(), ["k1", "k2", "k3"]);
    ///
    /// let fallback = StaticCredentials::new().with("groq", "gk-1");
    /// let pool = KeyPool::configure("", "groq", &fallback).unwrap();
    /// assert_eq!(pool.len(), 1);
    ///
    /// assert!(KeyPool::configure("", "groq", &none).is_err());
    /// ```
    pub fn configure(raw: &str, provider: &str, lookup: &dyn CredentialLookup) -> Result<Self> {
        let mut keys = split_keys(raw);
        if keys.is_empty() {
            if let Some(found) = lookup.lookup(provider) {
                keys = split_keys(&found);
            }
        }

        if keys.is_empty() {
            return Err(HermesError::Config(format!(
                "No API key found for provider '{}'. Set providers.{}.api_key or the provider's environment variable",
                provider,
                provider.to_lowercase()
            )));
        }

        debug!(provider = %provider, keys = keys.len(), "Configured key pool");
        Ok(Self {
            provider: provider.to_string(),
            keys,
        })
    }

    /// Draw one credential uniformly at random.
    pub fn select(&self) -> Result<&str> {
        self.keys
            .choose(&mut rand::rng())
            .map(String::as_str)
            .ok_or_else(|| {
                HermesError::Config(format!("Key pool for '{}' is empty", self.provider))
            })
    }

    /// The configured credentials, in order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether each turn should draw a fresh credential.
    pub fn rotates(&self) -> bool {
        self.keys.len() > 1
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

impl std::fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPool")
            .field("provider", &self.provider)
            .field("keys", &self.keys.len())
            .finish()
    }
}
