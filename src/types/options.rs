//! Generation parameters and their invariants.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};

/// Per-call generation parameters.
///
/// Every field is independently overridable; unset fields resolve to the
/// config defaults at request time. Invariants: `max_tokens > 0`,
/// `temperature` in `[0, 2]`, `top_p` in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Check declared ranges. Runs before any network attempt.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 {
                return Err(Error::validation_with_context(
                    "max_tokens must be greater than zero",
                    ErrorContext::new()
                        .with_field_path("options.max_tokens")
                        .with_source("request_validator"),
                ));
            }
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) || t.is_nan() {
                return Err(Error::validation_with_context(
                    "temperature must be within [0, 2]",
                    ErrorContext::new()
                        .with_field_path("options.temperature")
                        .with_details(format!("got {}", t))
                        .with_source("request_validator"),
                ));
            }
        }
        if let Some(p) = self.top_p {
            if !(0.0..=1.0).contains(&p) || p.is_nan() {
                return Err(Error::validation_with_context(
                    "top_p must be within [0, 1]",
                    ErrorContext::new()
                        .with_field_path("options.top_p")
                        .with_details(format!("got {}", p))
                        .with_source("request_validator"),
                ));
            }
        }
        Ok(())
    }

    /// Resolve unset fields against config defaults, yielding the
    /// effective parameter set sent on the wire (and fingerprinted).
    pub fn resolve(&self, default_max_tokens: u32, default_temperature: f64) -> ResolvedOptions {
        ResolvedOptions {
            max_tokens: self.max_tokens.unwrap_or(default_max_tokens),
            temperature: self.temperature.unwrap_or(default_temperature),
            top_p: self.top_p.unwrap_or(1.0),
            frequency_penalty: self.frequency_penalty.unwrap_or(0.0),
            presence_penalty: self.presence_penalty.unwrap_or(0.0),
        }
    }
}

/// Fully-resolved generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOptions {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_config_values() {
        let resolved = GenerationOptions::new().resolve(2000, 0.7);
        assert_eq!(resolved.max_tokens, 2000);
        assert_eq!(resolved.temperature, 0.7);
        assert_eq!(resolved.top_p, 1.0);
        assert_eq!(resolved.frequency_penalty, 0.0);
        assert_eq!(resolved.presence_penalty, 0.0);
    }

    #[test]
    fn overrides_win_over_defaults() {
        let resolved = GenerationOptions::new()
            .max_tokens(256)
            .temperature(0.0)
            .resolve(2000, 0.7);
        assert_eq!(resolved.max_tokens, 256);
        assert_eq!(resolved.temperature, 0.0);
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let err = GenerationOptions::new().temperature(5.0).validate();
        assert!(matches!(err, Err(Error::Validation { .. })));
        let err = GenerationOptions::new().temperature(-0.1).validate();
        assert!(matches!(err, Err(Error::Validation { .. })));
        assert!(GenerationOptions::new().temperature(2.0).validate().is_ok());
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let err = GenerationOptions::new().max_tokens(0).validate();
        assert!(matches!(err, Err(Error::Validation { .. })));
    }

    #[test]
    fn top_p_range_is_enforced() {
        assert!(GenerationOptions::new().top_p(1.0).validate().is_ok());
        assert!(GenerationOptions::new().top_p(1.1).validate().is_err());
    }
}
