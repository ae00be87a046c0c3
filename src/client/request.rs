//! Per-call request builder.

use crate::client::core::CodeGenClient;
use crate::client::types::{cancel_pair, CallStats, CancelHandle, CancelSignal};
use crate::prompt::PromptTemplate;
use crate::types::{GeneratedCode, GenerationOptions};
use crate::{Error, ErrorContext, Result};

/// Builder for generate requests.
///
/// The prompt comes either from `prompt` or from a [`PromptTemplate`];
/// setting both is a validation error.
pub struct GenerateRequestBuilder<'a> {
    client: &'a CodeGenClient,
    prompt: Option<String>,
    template: Option<PromptTemplate>,
    model: Option<String>,
    options: GenerationOptions,
    cancel: Option<CancelSignal>,
}

impl<'a> GenerateRequestBuilder<'a> {
    pub(crate) fn new(client: &'a CodeGenClient) -> Self {
        Self {
            client,
            prompt: None,
            template: None,
            model: None,
            options: GenerationOptions::default(),
            cancel: None,
        }
    }

    /// Set the prompt text.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Derive the prompt from a template; rendering errors surface at
    /// execute time, before any network I/O.
    pub fn template(mut self, template: PromptTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Override the configured default model for this call.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Replace the whole option set.
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.options.top_p = Some(top_p);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.options.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.options.presence_penalty = Some(penalty);
        self
    }

    /// Arm the request with a cancel handle.
    ///
    /// Cancelling aborts the in-flight HTTP attempt; the call fails with
    /// [`Error::Cancelled`] and the cache is left untouched.
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (handle, signal) = cancel_pair();
        self.cancel = Some(signal);
        (self, handle)
    }

    /// Execute the request and return the generated code.
    pub async fn execute(self) -> Result<GeneratedCode> {
        let (code, _stats) = self.execute_with_stats().await?;
        Ok(code)
    }

    /// Execute the request and return per-call stats alongside the result.
    pub async fn execute_with_stats(self) -> Result<(GeneratedCode, CallStats)> {
        let prompt = match (self.prompt, self.template) {
            (Some(prompt), None) => prompt,
            (None, Some(template)) => template.render()?,
            (Some(_), Some(_)) => {
                return Err(Error::validation_with_context(
                    "set either a prompt or a template, not both",
                    ErrorContext::new()
                        .with_field_path("request.prompt")
                        .with_source("request_builder"),
                ))
            }
            (None, None) => {
                return Err(Error::validation_with_context(
                    "a prompt or template is required",
                    ErrorContext::new()
                        .with_field_path("request.prompt")
                        .with_source("request_builder"),
                ))
            }
        };

        self.client
            .generate_inner(prompt, self.model, self.options, self.cancel)
            .await
    }
}
