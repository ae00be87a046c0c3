//! Structured prompt construction.
//!
//! A [`PromptTemplate`] maps a fixed set of named fields into a template
//! with `{name}` placeholders. Rendering fails when a placeholder has no
//! bound field or a bound field matches no placeholder, so templates never
//! reach the API with half-substituted text.

use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Default role instruction: respond with code only, no prose, no
/// markdown fencing.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert software developer. \
Generate complete, production-ready source code with proper typing, error handling, \
validation where needed, and idiomatic structure for the target language. \
Only respond with the code, no explanations or markdown formatting.";

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// A validated prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    fields: BTreeMap<String, String>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Bind a named field value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Placeholder names referenced by the template, in order of first use.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for cap in PLACEHOLDER_RE.captures_iter(&self.template) {
            let name = cap.get(1).expect("capture group").as_str();
            if seen.insert(name) {
                out.push(name);
            }
        }
        out
    }

    /// Substitute every placeholder, rejecting unknown or unused names.
    pub fn render(&self) -> Result<String> {
        let referenced: BTreeSet<&str> = self.placeholders().into_iter().collect();

        for name in &referenced {
            if !self.fields.contains_key(*name) {
                return Err(Error::validation_with_context(
                    format!("template placeholder {{{}}} has no bound field", name),
                    ErrorContext::new()
                        .with_field_path(format!("template.{}", name))
                        .with_source("prompt_builder"),
                ));
            }
        }
        for name in self.fields.keys() {
            if !referenced.contains(name.as_str()) {
                return Err(Error::validation_with_context(
                    format!("field '{}' matches no template placeholder", name),
                    ErrorContext::new()
                        .with_field_path(format!("fields.{}", name))
                        .with_source("prompt_builder"),
                ));
            }
        }

        let rendered = PLACEHOLDER_RE.replace_all(&self.template, |cap: &regex::Captures| {
            let name = cap.get(1).expect("capture group").as_str();
            self.fields[name].clone()
        });
        Ok(rendered.into_owned())
    }
}
