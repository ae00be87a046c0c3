//! Cache manager: TTL-aware typed get/set over a pluggable backend.

use super::backend::CacheBackend;
use super::key::CacheKey;
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default entry lifetime: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub default_ttl: Duration,
    pub enabled: bool,
    /// Entries larger than this are silently not stored.
    pub max_entry_size: usize,
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            enabled: true,
            max_entry_size: 10 * 1024 * 1024,
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

pub struct CacheManager {
    config: CacheConfig,
    backend: Box<dyn CacheBackend>,
    stats: Arc<AtomicStats>,
}

impl CacheManager {
    pub fn new(config: CacheConfig, backend: Box<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            stats: Arc::new(AtomicStats::new()),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let prefixed = self.prefix_key(key);
        match self.backend.get(&prefixed).await {
            Ok(Some(data)) => match serde_json::from_slice(&data) {
                Ok(val) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    Ok(Some(val))
                }
                // A corrupt entry counts as a miss, not a failure.
                Err(_) => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    Ok(None)
                }
            },
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<()> {
        self.set_with_ttl(key, value, self.config.default_ttl).await
    }

    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let data = serde_json::to_vec(value)?;
        if data.len() > self.config.max_entry_size {
            return Ok(());
        }
        let prefixed = self.prefix_key(key);
        match self.backend.set(&prefixed, &data, ttl).await {
            Ok(()) => {
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Explicit invalidation of a single fingerprint.
    pub async fn delete(&self, key: &CacheKey) -> Result<bool> {
        if !self.config.enabled {
            return Ok(false);
        }
        let prefixed = self.prefix_key(key);
        match self.backend.delete(&prefixed).await {
            Ok(deleted) => {
                if deleted {
                    self.stats.deletes.fetch_add(1, Ordering::Relaxed);
                }
                Ok(deleted)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    fn prefix_key(&self, key: &CacheKey) -> CacheKey {
        if let Some(ref p) = self.config.key_prefix {
            CacheKey::new(format!("{}:{}", p, key.hash))
        } else {
            key.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn manager(config: CacheConfig) -> CacheManager {
        CacheManager::new(config, Box::new(MemoryCache::new(64)))
    }

    #[tokio::test]
    async fn typed_round_trip_counts_hits_and_misses() {
        let cache = manager(CacheConfig::default());
        let key = CacheKey::new("fingerprint");

        let miss: Option<String> = cache.get(&key).await.unwrap();
        assert!(miss.is_none());

        cache.set(&key, &"generated".to_string()).await.unwrap();
        let hit: Option<String> = cache.get(&key).await.unwrap();
        assert_eq!(hit.as_deref(), Some("generated"));

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.sets, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn disabled_cache_neither_stores_nor_serves() {
        let cache = manager(CacheConfig::default().with_enabled(false));
        let key = CacheKey::new("fingerprint");
        cache.set(&key, &"generated".to_string()).await.unwrap();
        let got: Option<String> = cache.get(&key).await.unwrap();
        assert!(got.is_none());
        assert_eq!(cache.stats().sets, 0);
    }

    #[tokio::test]
    async fn corrupt_entry_reads_as_a_miss_not_a_hit() {
        let backend = MemoryCache::new(64);
        let key = CacheKey::new("fingerprint");
        backend
            .set(&key, b"not json", Duration::from_secs(60))
            .await
            .unwrap();

        let cache = CacheManager::new(CacheConfig::default(), Box::new(backend));
        let got: Option<String> = cache.get(&key).await.unwrap();
        assert!(got.is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.hit_ratio(), 0.0);
    }

    #[tokio::test]
    async fn ttl_override_expires_entries() {
        let cache = manager(CacheConfig::default());
        let key = CacheKey::new("fingerprint");
        cache
            .set_with_ttl(&key, &"generated".to_string(), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let got: Option<String> = cache.get(&key).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn prefix_separates_namespaces() {
        let backend = std::sync::Arc::new(MemoryCache::new(64));
        // Two managers over the same backend, different prefixes.
        struct Shared(std::sync::Arc<MemoryCache>);
        #[async_trait::async_trait]
        impl CacheBackend for Shared {
            async fn get(&self, key: &CacheKey) -> crate::Result<Option<Vec<u8>>> {
                self.0.get(key).await
            }
            async fn set(
                &self,
                key: &CacheKey,
                value: &[u8],
                ttl: Duration,
            ) -> crate::Result<()> {
                self.0.set(key, value, ttl).await
            }
            async fn delete(&self, key: &CacheKey) -> crate::Result<bool> {
                self.0.delete(key).await
            }
            async fn exists(&self, key: &CacheKey) -> crate::Result<bool> {
                self.0.exists(key).await
            }
            async fn clear(&self) -> crate::Result<()> {
                self.0.clear().await
            }
            async fn len(&self) -> crate::Result<usize> {
                self.0.len().await
            }
            fn name(&self) -> &'static str {
                "shared-memory"
            }
        }

        let a = CacheManager::new(
            CacheConfig::default().with_key_prefix("a"),
            Box::new(Shared(backend.clone())),
        );
        let b = CacheManager::new(
            CacheConfig::default().with_key_prefix("b"),
            Box::new(Shared(backend)),
        );

        let key = CacheKey::new("fingerprint");
        a.set(&key, &"from-a".to_string()).await.unwrap();
        let got: Option<String> = b.get(&key).await.unwrap();
        assert!(got.is_none());
    }
}
