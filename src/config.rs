//! Client configuration.
//!
//! `ClientConfig` is immutable after construction: reconfiguration goes
//! through consuming `with_*` methods that return a new effective config.
//! There is no process-wide singleton; the config is handed to the client
//! at build time.

use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;

/// Default OpenRouter-compatible API base.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Default completion budget.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for a [`crate::CodeGenClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    pub default_max_tokens: u32,
    pub default_temperature: f64,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config with library defaults for everything but the
    /// credentials and model.
    pub fn new(api_key: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: default_model.into(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            default_temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a config from environment variables:
    ///
    /// - `CODEGEN_API_KEY` (required)
    /// - `CODEGEN_DEFAULT_MODEL` (required)
    /// - `CODEGEN_BASE_URL`
    /// - `CODEGEN_MAX_TOKENS`
    /// - `CODEGEN_TEMPERATURE`
    /// - `CODEGEN_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("CODEGEN_API_KEY").map_err(|_| {
            Error::configuration_with_context(
                "CODEGEN_API_KEY is not set",
                ErrorContext::new()
                    .with_field_path("config.api_key")
                    .with_source("env_loader"),
            )
        })?;
        let default_model = env::var("CODEGEN_DEFAULT_MODEL").map_err(|_| {
            Error::configuration_with_context(
                "CODEGEN_DEFAULT_MODEL is not set",
                ErrorContext::new()
                    .with_field_path("config.default_model")
                    .with_source("env_loader"),
            )
        })?;

        let mut config = Self::new(api_key, default_model);
        if let Ok(base) = env::var("CODEGEN_BASE_URL") {
            config.base_url = base;
        }
        config.default_max_tokens = env::var("CODEGEN_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(config.default_max_tokens);
        config.default_temperature = env::var("CODEGEN_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(config.default_temperature);
        config.timeout = env::var("CODEGEN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.timeout);

        Ok(config)
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the default model identifier.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Override the default completion budget.
    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    /// Override the default sampling temperature.
    pub fn with_default_temperature(mut self, temperature: f64) -> Self {
        self.default_temperature = temperature;
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fail fast on credentials or addressing problems, before any
    /// network attempt is ever made with this config.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "API key must not be empty",
                ErrorContext::new()
                    .with_field_path("config.api_key")
                    .with_source("config_validator"),
            ));
        }
        if self.default_model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "default model must not be empty",
                ErrorContext::new()
                    .with_field_path("config.default_model")
                    .with_source("config_validator"),
            ));
        }
        // Defaults flow onto the wire whenever a call leaves an option
        // unset, so they must satisfy the same ranges as per-call values.
        if self.default_max_tokens == 0 {
            return Err(Error::configuration_with_context(
                "default max_tokens must be greater than zero",
                ErrorContext::new()
                    .with_field_path("config.default_max_tokens")
                    .with_source("config_validator"),
            ));
        }
        if !(0.0..=2.0).contains(&self.default_temperature) || self.default_temperature.is_nan() {
            return Err(Error::configuration_with_context(
                "default temperature must be within [0, 2]",
                ErrorContext::new()
                    .with_field_path("config.default_temperature")
                    .with_details(format!("got {}", self.default_temperature))
                    .with_source("config_validator"),
            ));
        }
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("base URL is not a valid URL: {}", e),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_source("config_validator"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("base URL scheme must be http or https, got {}", parsed.scheme()),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_source("config_validator"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ClientConfig::new("sk-test", "openai/gpt-4o");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_max_tokens, 2000);
        assert_eq!(config.default_temperature, 0.7);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn with_methods_return_new_effective_config() {
        let config = ClientConfig::new("sk-test", "openai/gpt-4o")
            .with_base_url("https://example.com/v1")
            .with_default_max_tokens(512)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "https://example.com/v1");
        assert_eq!(config.default_max_tokens, 512);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn empty_api_key_is_a_configuration_error() {
        let config = ClientConfig::new("   ", "openai/gpt-4o");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn out_of_range_defaults_are_rejected() {
        let config = ClientConfig::new("sk-test", "openai/gpt-4o").with_default_temperature(5.0);
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));

        let config = ClientConfig::new("sk-test", "openai/gpt-4o").with_default_max_tokens(0);
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));

        let config = ClientConfig::new("sk-test", "openai/gpt-4o").with_default_temperature(2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let config = ClientConfig::new("sk-test", "openai/gpt-4o").with_base_url("not a url");
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));

        let config = ClientConfig::new("sk-test", "openai/gpt-4o").with_base_url("ftp://host/v1");
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));
    }
}
