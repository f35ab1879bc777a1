//! Developer assistant endpoint configuration
//!
//! Resolution order for the API key:
//! 1. `GEMINI_API_KEY`
//! 2. `API_KEY` (the variable the browser build used)
//!
//! Model and endpoint come from the JSON config and may be overridden with
//! `MIDNIGHT_ASSISTANT_MODEL` / `MIDNIGHT_ASSISTANT_ENDPOINT`.
//!
//! ```bash
//! export GEMINI_API_KEY="YOUR_KEY"
//! midnight-wallet ask "How do shielded transactions work in Midnight?"
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Primary API key environment variable name
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable names
mod env_vars {
    pub const API_KEY: &str = "API_KEY";
    pub const MODEL: &str = "MIDNIGHT_ASSISTANT_MODEL";
    pub const ENDPOINT: &str = "MIDNIGHT_ASSISTANT_ENDPOINT";
}

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Serializable assistant settings (never carries the key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantSettings {
    /// Base URL of the generative-language API
    pub endpoint: String,
    /// Model used for developer questions
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Resolved assistant configuration, including the secret key
#[derive(Debug)]
pub struct AssistantConfig {
    pub endpoint: Url,
    pub model: String,
    pub timeout_secs: u64,
    api_key: SecretString,
}

impl AssistantConfig {
    /// Resolve from settings plus the process environment
    pub fn from_env(settings: &AssistantSettings) -> Result<Self> {
        Self::resolve(settings, |name| std::env::var(name).ok())
    }

    /// Resolve with an explicit variable lookup
    pub fn resolve<F>(settings: &AssistantSettings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(GEMINI_API_KEY_ENV)
            .or_else(|| lookup(env_vars::API_KEY))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} (or {}) must be set to use the assistant",
                    GEMINI_API_KEY_ENV,
                    env_vars::API_KEY
                ))
            })?;

        let endpoint = lookup(env_vars::ENDPOINT).unwrap_or_else(|| settings.endpoint.clone());
        let endpoint: Url = endpoint
            .parse()
            .map_err(|e| Error::Config(format!("Invalid assistant endpoint: {}", e)))?;

        let model = lookup(env_vars::MODEL).unwrap_or_else(|| settings.model.clone());
        tracing::debug!(endpoint = %endpoint, model = %model, "Resolved assistant config");

        Ok(Self {
            endpoint,
            model,
            timeout_secs: settings.timeout_secs,
            api_key: SecretString::from(api_key),
        })
    }

    /// Build an explicit config (tests, embedding)
    pub fn new(endpoint: Url, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint,
            model: model.into(),
            timeout_secs: AssistantSettings::default().timeout_secs,
            api_key: SecretString::from(api_key.into()),
        }
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = AssistantConfig::resolve(&AssistantSettings::default(), lookup_from(&[]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_gemini_key_takes_priority() {
        let config = AssistantConfig::resolve(
            &AssistantSettings::default(),
            lookup_from(&[(GEMINI_API_KEY_ENV, "primary"), ("API_KEY", "fallback")]),
        )
        .unwrap();
        assert_eq!(config.api_key(), "primary");
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_fallback_key_and_overrides() {
        let config = AssistantConfig::resolve(
            &AssistantSettings::default(),
            lookup_from(&[
                ("API_KEY", "fallback"),
                ("MIDNIGHT_ASSISTANT_MODEL", "gemini-2.5-flash"),
                ("MIDNIGHT_ASSISTANT_ENDPOINT", "http://127.0.0.1:9000/v1beta"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_key(), "fallback");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.endpoint.host_str(), Some("127.0.0.1"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AssistantConfig::new(
            DEFAULT_ENDPOINT.parse().unwrap(),
            DEFAULT_MODEL,
            "super-secret-key",
        );
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("super-secret-key"));
    }
}
