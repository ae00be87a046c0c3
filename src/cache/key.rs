//! Request fingerprinting.

use crate::types::options::ResolvedOptions;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A cache key: the hex SHA-256 fingerprint plus the model it was
/// computed for (useful for targeted invalidation and logging).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: String,
    pub model: Option<String>,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Deterministic fingerprint over a request's semantic inputs.
///
/// The tuple is canonicalized into a `BTreeMap` (stable field order),
/// floats are written with fixed precision, and the JSON form is hashed
/// with SHA-256. A pure function: identical inputs always yield the same
/// key, regardless of process or call site.
pub struct CacheKeyGenerator {
    salt: Option<String>,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self { salt: None }
    }

    /// Namespace keys, e.g. to separate environments sharing one store.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn generate(
        &self,
        system_prompt: &str,
        prompt: &str,
        model: &str,
        options: &ResolvedOptions,
    ) -> CacheKey {
        let mut parts: BTreeMap<&str, String> = BTreeMap::new();
        parts.insert("system", system_prompt.to_string());
        parts.insert("prompt", prompt.to_string());
        parts.insert("model", model.to_string());
        parts.insert("max_tokens", options.max_tokens.to_string());
        parts.insert("temperature", format!("{:.4}", options.temperature));
        parts.insert("top_p", format!("{:.4}", options.top_p));
        parts.insert(
            "frequency_penalty",
            format!("{:.4}", options.frequency_penalty),
        );
        parts.insert(
            "presence_penalty",
            format!("{:.4}", options.presence_penalty),
        );
        if let Some(ref s) = self.salt {
            parts.insert("salt", s.clone());
        }

        let canonical = serde_json::to_string(&parts).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        CacheKey::new(hash).with_model(model)
    }
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ResolvedOptions {
        ResolvedOptions {
            max_tokens: 2000,
            temperature: 0.7,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }

    #[test]
    fn identical_inputs_produce_identical_keys() {
        let gen = CacheKeyGenerator::new();
        let a = gen.generate("sys", "make a parser", "openai/gpt-4o", &opts());
        let b = gen.generate("sys", "make a parser", "openai/gpt-4o", &opts());
        assert_eq!(a, b);
        assert_eq!(a.hash.len(), 64);
    }

    #[test]
    fn any_input_change_changes_the_key() {
        let gen = CacheKeyGenerator::new();
        let base = gen.generate("sys", "make a parser", "openai/gpt-4o", &opts());

        let other_prompt = gen.generate("sys", "make a lexer", "openai/gpt-4o", &opts());
        assert_ne!(base.hash, other_prompt.hash);

        let other_model = gen.generate("sys", "make a parser", "anthropic/claude", &opts());
        assert_ne!(base.hash, other_model.hash);

        let mut tweaked = opts();
        tweaked.temperature = 0.8;
        let other_options = gen.generate("sys", "make a parser", "openai/gpt-4o", &tweaked);
        assert_ne!(base.hash, other_options.hash);

        let other_system = gen.generate("sys2", "make a parser", "openai/gpt-4o", &opts());
        assert_ne!(base.hash, other_system.hash);
    }

    #[test]
    fn salt_namespaces_keys() {
        let plain = CacheKeyGenerator::new();
        let salted = CacheKeyGenerator::new().with_salt("staging");
        let a = plain.generate("sys", "p", "m", &opts());
        let b = salted.generate("sys", "p", "m", &opts());
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn key_records_the_model() {
        let key = CacheKeyGenerator::new().generate("sys", "p", "openai/gpt-4o", &opts());
        assert_eq!(key.model.as_deref(), Some("openai/gpt-4o"));
    }
}
