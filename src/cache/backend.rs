//! Cache backend implementations.

use super::key::CacheKey;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    data: Vec<u8>,
    created_at: Instant,
    ttl: Duration,
    last_accessed: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            data,
            created_at: now,
            ttl,
            last_accessed: now,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Key-value store with TTL semantics.
///
/// Backends must support concurrent reads and at-least-serializable
/// writes; no cross-entry ordering is required. An external store
/// (shared cache service) is a valid implementation and may suspend.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &CacheKey) -> Result<bool>;
    async fn exists(&self, key: &CacheKey) -> Result<bool>;
    async fn clear(&self) -> Result<()>;
    async fn len(&self) -> Result<usize>;
    fn name(&self) -> &'static str;
}

/// In-process cache: an `RwLock`-guarded map with TTL expiry and
/// least-recently-accessed eviction once `max_entries` is reached.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    fn evict_if_needed(&self, entries: &mut HashMap<String, CacheEntry>) {
        entries.retain(|_, e| !e.is_expired());
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                entries.remove(&k);
            } else {
                break;
            }
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(&key.hash) {
            if entry.is_expired() {
                entries.remove(&key.hash);
                return Ok(None);
            }
            entry.last_accessed = Instant::now();
            return Ok(Some(entry.data.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        self.evict_if_needed(&mut entries);
        entries.insert(key.hash.clone(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries.remove(&key.hash).is_some())
    }

    async fn exists(&self, key: &CacheKey) -> Result<bool> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .get(&key.hash)
            .map(|e| !e.is_expired())
            .unwrap_or(false))
    }

    async fn clear(&self) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|e| !e.is_expired())
            .count())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// No-op backend: every lookup misses, every write is dropped.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn get(&self, _: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
    async fn set(&self, _: &CacheKey, _: &[u8], _: Duration) -> Result<()> {
        Ok(())
    }
    async fn delete(&self, _: &CacheKey) -> Result<bool> {
        Ok(false)
    }
    async fn exists(&self, _: &CacheKey) -> Result<bool> {
        Ok(false)
    }
    async fn clear(&self) -> Result<()> {
        Ok(())
    }
    async fn len(&self) -> Result<usize> {
        Ok(0)
    }
    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = MemoryCache::new(16);
        let key = CacheKey::new("k1");
        cache
            .set(&key, b"value", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"value".to_vec()));
        assert!(cache.exists(&key).await.unwrap());
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let cache = MemoryCache::new(16);
        let key = CacheKey::new("k1");
        cache
            .set(&key, b"value", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(&key).await.unwrap(), None);
        assert!(!cache.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn eviction_drops_least_recently_accessed() {
        let cache = MemoryCache::new(2);
        let ttl = Duration::from_secs(60);
        cache.set(&CacheKey::new("a"), b"a", ttl).await.unwrap();
        cache.set(&CacheKey::new("b"), b"b", ttl).await.unwrap();
        // Touch "a" so "b" becomes the eviction candidate.
        cache.get(&CacheKey::new("a")).await.unwrap();
        cache.set(&CacheKey::new("c"), b"c", ttl).await.unwrap();
        assert!(cache.get(&CacheKey::new("a")).await.unwrap().is_some());
        assert!(cache.get(&CacheKey::new("b")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let cache = MemoryCache::new(16);
        let ttl = Duration::from_secs(60);
        cache.set(&CacheKey::new("a"), b"a", ttl).await.unwrap();
        assert!(cache.delete(&CacheKey::new("a")).await.unwrap());
        assert!(!cache.delete(&CacheKey::new("a")).await.unwrap());
        cache.set(&CacheKey::new("b"), b"b", ttl).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn null_cache_never_stores() {
        let cache = NullCache::new();
        let key = CacheKey::new("k");
        cache
            .set(&key, b"v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
        assert_eq!(cache.len().await.unwrap(), 0);
    }
}
