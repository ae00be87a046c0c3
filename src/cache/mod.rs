//! Response caching for generated code.
//!
//! A cache entry is keyed by a deterministic fingerprint of the request's
//! semantic inputs (system prompt, user prompt, resolved model, resolved
//! options) and holds the verbatim generated text until its TTL elapses.
//! Identical inputs always resolve to the same fingerprint; entries are
//! never mutated in place, an update is always a fresh put; errors are
//! never cached.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheManager`] | TTL-aware get/set with hit/miss statistics |
//! | [`CacheConfig`] | TTL, enable flag, entry size limit, key prefix |
//! | [`CacheBackend`] | Trait for pluggable stores |
//! | [`MemoryCache`] | In-process map with TTL expiry and LRU eviction |
//! | [`NullCache`] | No-op backend for disabling caching |
//! | [`CacheKey`] / [`CacheKeyGenerator`] | Request fingerprinting |

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use key::{CacheKey, CacheKeyGenerator};
pub use manager::{CacheConfig, CacheManager, CacheStats};
