//! The code generation client.

use crate::cache::{CacheKey, CacheKeyGenerator, CacheManager, CacheStats};
use crate::client::policy::{Decision, RetryPolicy};
use crate::client::request::GenerateRequestBuilder;
use crate::client::types::{CallStats, CancelSignal};
use crate::config::ClientConfig;
use crate::transport::HttpTransport;
use crate::types::options::ResolvedOptions;
use crate::types::{CachedCompletion, GeneratedCode, GenerationOptions};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Client for a chat-completion style code-generation API.
///
/// One operation: turn a prompt into generated source text, serving
/// repeated requests from a fingerprint-keyed TTL cache and retrying
/// transient upstream failures. The returned text is exactly the upstream
/// model's content; post-processing is the caller's concern.
pub struct CodeGenClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: HttpTransport,
    pub(crate) cache: CacheManager,
    pub(crate) key_gen: CacheKeyGenerator,
    pub(crate) retry_policy: RetryPolicy,
    pub(crate) system_prompt: String,
    pub(crate) single_flight: bool,
    pub(crate) attempt_timeout: Option<std::time::Duration>,
    /// Per-fingerprint locks collapsing concurrent identical requests.
    pub(crate) inflight: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CodeGenClient {
    /// Create a client with default cache, retry, and prompt settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        crate::client::builder::CodeGenClientBuilder::new()
            .config(config)
            .build()
    }

    pub fn builder() -> crate::client::builder::CodeGenClientBuilder {
        crate::client::builder::CodeGenClientBuilder::new()
    }

    /// Start building a generate request.
    pub fn generate(&self) -> GenerateRequestBuilder<'_> {
        GenerateRequestBuilder::new(self)
    }

    /// Generate code for a prompt with all defaults.
    pub async fn generate_code(&self, prompt: impl Into<String>) -> Result<GeneratedCode> {
        self.generate().prompt(prompt).execute().await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The fingerprint a request would be cached under.
    pub fn fingerprint(
        &self,
        prompt: &str,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> CacheKey {
        let model = model.unwrap_or(&self.config.default_model);
        let resolved = options.resolve(
            self.config.default_max_tokens,
            self.config.default_temperature,
        );
        self.key_gen
            .generate(&self.system_prompt, prompt, model, &resolved)
    }

    /// Explicitly invalidate the cache entry for a request.
    pub async fn invalidate(
        &self,
        prompt: &str,
        model: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<bool> {
        let key = self.fingerprint(prompt, model, options);
        self.cache.delete(&key).await
    }

    pub(crate) async fn generate_inner(
        &self,
        prompt: String,
        model_override: Option<String>,
        options: GenerationOptions,
        mut cancel: Option<CancelSignal>,
    ) -> Result<(GeneratedCode, CallStats)> {
        let start = Instant::now();
        crate::client::validation::validate_request(&prompt, &options)?;

        let model = model_override.unwrap_or_else(|| self.config.default_model.clone());
        let resolved = options.resolve(
            self.config.default_max_tokens,
            self.config.default_temperature,
        );
        let key = self
            .key_gen
            .generate(&self.system_prompt, &prompt, &model, &resolved);

        if let Some(hit) = self.cache.get::<CachedCompletion>(&key).await? {
            debug!(fingerprint = %key, model = %model, "cache hit");
            return Ok(Self::cached_result(hit, start));
        }

        if !self.single_flight {
            return self
                .fetch_and_store(&key, &prompt, &model, &resolved, &mut cancel, start)
                .await;
        }

        let lock = {
            let mut table = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
            table
                .entry(key.hash.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        // Removes the table entry even when the caller drops this future
        // mid-flight, so aborted calls cannot grow the table.
        let _slot = InflightGuard {
            table: &self.inflight,
            key: key.hash.clone(),
        };
        let _guard = lock.lock().await;

        // A leader may have populated the cache while we waited for the lock.
        if let Some(hit) = self.cache.get::<CachedCompletion>(&key).await? {
            debug!(fingerprint = %key, model = %model, "cache hit after single-flight wait");
            return Ok(Self::cached_result(hit, start));
        }

        self.fetch_and_store(&key, &prompt, &model, &resolved, &mut cancel, start)
            .await
    }

    fn cached_result(hit: CachedCompletion, start: Instant) -> (GeneratedCode, CallStats) {
        let stats = CallStats {
            model: hit.model.clone(),
            http_status: None,
            retry_count: 0,
            duration_ms: start.elapsed().as_millis(),
            cache_hit: true,
            client_request_id: None,
        };
        (
            GeneratedCode {
                content: hit.content,
                model: hit.model,
                usage: None,
                cached: true,
            },
            stats,
        )
    }

    /// Retry loop around single attempts; on success, populate the cache
    /// and return. Failures and cancellations never populate the cache.
    async fn fetch_and_store(
        &self,
        key: &CacheKey,
        prompt: &str,
        model: &str,
        resolved: &ResolvedOptions,
        cancel: &mut Option<CancelSignal>,
        start: Instant,
    ) -> Result<(GeneratedCode, CallStats)> {
        let client_request_id = Uuid::new_v4().to_string();
        let mut attempt: u32 = 0;
        let mut retry_count: u32 = 0;

        loop {
            match self
                .attempt(prompt, model, resolved, &client_request_id, cancel)
                .await
            {
                Ok(outcome) => {
                    let value = CachedCompletion {
                        content: outcome.content.clone(),
                        model: model.to_string(),
                    };
                    // The result is already in hand; a failing cache write
                    // costs a future network call, not this one.
                    if let Err(e) = self.cache.set(key, &value).await {
                        warn!(fingerprint = %key, error = %e, "failed to store cache entry");
                    }

                    let stats = CallStats {
                        model: model.to_string(),
                        http_status: Some(outcome.http_status),
                        retry_count,
                        duration_ms: start.elapsed().as_millis(),
                        cache_hit: false,
                        client_request_id: Some(client_request_id),
                    };
                    return Ok((
                        GeneratedCode {
                            content: outcome.content,
                            model: model.to_string(),
                            usage: outcome.usage,
                            cached: false,
                        },
                        stats,
                    ));
                }
                Err(e) => match self.retry_policy.decide(&e, attempt) {
                    Decision::Retry { delay } => {
                        debug!(
                            attempt = attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "retrying after transient failure"
                        );
                        retry_count = retry_count.saturating_add(1);
                        if delay.as_millis() > 0 {
                            tokio::time::sleep(delay).await;
                        }
                        attempt = attempt.saturating_add(1);
                    }
                    Decision::Fail => return Err(e),
                },
            }
        }
    }

    /// One attempt, guarded by the optional attempt timeout and the
    /// caller's cancel signal. An aborted attempt surfaces
    /// [`Error::Cancelled`] without touching the cache.
    async fn attempt(
        &self,
        prompt: &str,
        model: &str,
        resolved: &ResolvedOptions,
        client_request_id: &str,
        cancel: &mut Option<CancelSignal>,
    ) -> Result<crate::client::execution::AttemptOutcome> {
        let fut = async {
            match self.attempt_timeout {
                Some(t) => {
                    match tokio::time::timeout(
                        t,
                        self.execute_once(prompt, model, resolved, client_request_id),
                    )
                    .await
                    {
                        Ok(res) => res,
                        Err(_) => Err(Error::runtime_with_context(
                            "attempt timeout",
                            crate::ErrorContext::new().with_source("timeout_policy"),
                        )),
                    }
                }
                None => {
                    self.execute_once(prompt, model, resolved, client_request_id)
                        .await
                }
            }
        };

        match cancel {
            Some(signal) => {
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => Err(Error::Cancelled),
                    res = fut => res,
                }
            }
            None => fut.await,
        }
    }
}

/// Removes an in-flight table entry when the owning call completes or is
/// dropped. Followers already holding a clone of the key lock keep using
/// it; newcomers start fresh and re-check the cache first.
struct InflightGuard<'a> {
    table: &'a StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    key: String,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inflight_guard_removes_its_entry_on_drop() {
        let table = StdMutex::new(HashMap::new());
        table
            .lock()
            .unwrap()
            .insert("fp".to_string(), Arc::new(Mutex::new(())));
        {
            let _slot = InflightGuard {
                table: &table,
                key: "fp".into(),
            };
        }
        assert!(table.lock().unwrap().is_empty());
    }
}
