//! Client construction.
//!
//! Keep this surface area small and predictable (developer-friendly).

use crate::cache::{CacheBackend, CacheConfig, CacheKeyGenerator, CacheManager, MemoryCache};
use crate::client::core::CodeGenClient;
use crate::client::policy::RetryPolicy;
use crate::config::ClientConfig;
use crate::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::transport::HttpTransport;
use crate::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Builder for [`CodeGenClient`].
pub struct CodeGenClientBuilder {
    config: Option<ClientConfig>,
    cache_backend: Option<Box<dyn CacheBackend>>,
    cache_config: CacheConfig,
    retry_policy: Option<RetryPolicy>,
    system_prompt: Option<String>,
    single_flight: bool,
    key_salt: Option<String>,
    attempt_timeout: Option<Duration>,
}

impl CodeGenClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            cache_backend: None,
            cache_config: CacheConfig::default(),
            retry_policy: None,
            system_prompt: None,
            single_flight: true,
            key_salt: None,
            attempt_timeout: None,
        }
    }

    /// Set the client configuration. Without this, `build()` reads the
    /// environment via [`ClientConfig::from_env`].
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Plug in a cache backend. Default is an in-process
    /// [`MemoryCache`].
    pub fn cache_backend(mut self, backend: Box<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    /// Set cache behavior (TTL, entry size limit, key prefix).
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Override just the cache TTL (default 24 hours).
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_config.default_ttl = ttl;
        self
    }

    /// Turn caching off entirely.
    pub fn disable_cache(mut self) -> Self {
        self.cache_config.enabled = false;
        self
    }

    /// Set the retry policy. Default retries transient failures up to
    /// 3 times with exponential backoff; `RetryPolicy::none()` restores
    /// the minimal no-retry contract.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Override the system message establishing the assistant's role.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Collapse concurrent identical requests into one upstream call
    /// (default on).
    pub fn single_flight(mut self, enable: bool) -> Self {
        self.single_flight = enable;
        self
    }

    /// Namespace cache keys, e.g. to separate environments sharing a
    /// store.
    pub fn key_salt(mut self, salt: impl Into<String>) -> Self {
        self.key_salt = Some(salt.into());
        self
    }

    /// Per-attempt timeout guard. The transport has its own total
    /// timeout; this is an extra bound applied to each retry attempt.
    /// Also settable via `CODEGEN_ATTEMPT_TIMEOUT_MS`.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CodeGenClient> {
        let config = match self.config {
            Some(config) => config,
            None => ClientConfig::from_env()?,
        };
        config.validate()?;

        let transport = HttpTransport::new(&config)?;

        let backend = self.cache_backend.unwrap_or_else(|| {
            let capacity = std::env::var("CODEGEN_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_CACHE_CAPACITY);
            Box::new(MemoryCache::new(capacity))
        });
        let cache = CacheManager::new(self.cache_config, backend);

        let retry_policy = self.retry_policy.unwrap_or_else(|| {
            let mut policy = RetryPolicy::default();
            if let Some(n) = std::env::var("CODEGEN_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
            {
                policy.max_retries = n;
            }
            policy
        });

        let attempt_timeout = self.attempt_timeout.or_else(|| {
            std::env::var("CODEGEN_ATTEMPT_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
        });

        let mut key_gen = CacheKeyGenerator::new();
        if let Some(salt) = self.key_salt {
            key_gen = key_gen.with_salt(salt);
        }

        Ok(CodeGenClient {
            config,
            transport,
            cache,
            key_gen,
            retry_policy,
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            single_flight: self.single_flight,
            attempt_timeout,
            inflight: Mutex::new(HashMap::new()),
        })
    }
}

impl Default for CodeGenClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
