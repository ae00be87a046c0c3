//! Upstream response models and the operation result.

use serde::{Deserialize, Serialize};

/// Wire model for a chat-completion response body.
///
/// Only the fields this client reads are modeled; everything else in the
/// body is ignored. `usage` is carried through opaquely.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatCompletion {
    /// First completion's textual content, if the body actually has one.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Result of a generate call.
///
/// `content` is exactly the upstream model's text, unmodified. Any
/// post-processing is the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCode {
    pub content: String,
    /// Model the text was generated with (resolved, not the override).
    pub model: String,
    /// Upstream usage block, absent on cache hits.
    pub usage: Option<serde_json::Value>,
    /// Whether this result was served from the cache.
    pub cached: bool,
}

/// Cache value: what gets stored under a fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCompletion {
    pub content: String,
    pub model: String,
}
