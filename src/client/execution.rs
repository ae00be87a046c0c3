//! Request execution logic (single-attempt).

use crate::types::options::ResolvedOptions;
use crate::types::{ChatCompletion, Message};
use crate::{Error, ErrorContext, Result};
use reqwest::header::HeaderMap;
use serde_json::json;
use tracing::{debug, info};

use super::core::CodeGenClient;
use super::error_classification::{classify_status, is_retryable_status};

/// Path of the chat-completion endpoint, relative to the base URL.
pub(crate) const COMPLETIONS_PATH: &str = "/chat/completions";

/// What a successful attempt hands back to the retry loop.
pub(crate) struct AttemptOutcome {
    pub content: String,
    pub usage: Option<serde_json::Value>,
    pub http_status: u16,
}

impl CodeGenClient {
    fn header_first(headers: &HeaderMap, names: &[&str]) -> Option<String> {
        for name in names {
            if let Some(v) = headers.get(*name) {
                if let Ok(s) = v.to_str() {
                    let s = s.trim();
                    if !s.is_empty() {
                        return Some(s.to_string());
                    }
                }
            }
        }
        None
    }

    /// Best-effort parsing of `Retry-After`.
    ///
    /// Only the common `Retry-After: <seconds>` form is supported.
    fn retry_after_ms(headers: &HeaderMap) -> Option<u32> {
        let raw = Self::header_first(headers, &["retry-after"])?;
        let secs: u32 = raw.parse().ok()?;
        Some(secs.saturating_mul(1000))
    }

    /// Upstream-provided error message from the common
    /// `{"error":{"message":...}}` shape, if the body has one.
    fn upstream_message(body: &str) -> Option<String> {
        let json: serde_json::Value = serde_json::from_str(body).ok()?;
        json.get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// One POST to the completions endpoint. No retry here; the policy
    /// loop lives in the caller.
    pub(crate) async fn execute_once(
        &self,
        prompt: &str,
        model: &str,
        options: &ResolvedOptions,
        client_request_id: &str,
    ) -> Result<AttemptOutcome> {
        let messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(prompt),
        ];
        let request_body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "top_p": options.top_p,
            "frequency_penalty": options.frequency_penalty,
            "presence_penalty": options.presence_penalty,
            "stream": false,
        });

        let start = std::time::Instant::now();
        let resp = self
            .transport
            .post_json(COMPLETIONS_PATH, &request_body, Some(client_request_id))
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let class = classify_status(status);
            let retryable = is_retryable_status(status);
            let headers = resp.headers().clone();
            let retry_after_ms = Self::retry_after_ms(&headers);
            let body = resp.text().await.unwrap_or_default();
            let message = Self::upstream_message(&body).unwrap_or_else(|| body.clone());

            info!(
                http_status = status,
                error_class = class,
                model = model,
                client_request_id = client_request_id,
                duration_ms = start.elapsed().as_millis() as u64,
                "code generation request failed"
            );

            return Err(Error::Remote {
                status,
                class: class.to_string(),
                message,
                retryable,
                retry_after_ms,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Transport(crate::transport::TransportError::Http(e)))?;

        let completion: ChatCompletion = serde_json::from_str(&body).map_err(|e| {
            Error::malformed_with_context(
                format!("response body is not valid completion JSON: {}", e),
                ErrorContext::new().with_source("response_parser"),
            )
        })?;

        let content = completion.content().ok_or_else(|| {
            Error::malformed_with_context(
                "response body has no choices[0].message.content",
                ErrorContext::new()
                    .with_field_path("choices[0].message.content")
                    .with_source("response_parser"),
            )
        })?;

        debug!(
            http_status = status,
            model = model,
            client_request_id = client_request_id,
            duration_ms = start.elapsed().as_millis() as u64,
            content_len = content.len(),
            "code generation request succeeded"
        );

        Ok(AttemptOutcome {
            content: content.to_string(),
            usage: completion.usage.clone(),
            http_status: status,
        })
    }
}
