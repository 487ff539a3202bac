//! Pluggable signing-key cache
//!
//! The cache is a capability, not a singleton: callers inject anything that
//! satisfies [`KeyCache`] (an edge KV namespace, a process-local map, a test
//! recorder) or supply none at all, in which case every resolution fetches
//! from the key source. Entry lifecycle is owned entirely by the cache
//! implementation via the TTL supplied on `put`.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Errors produced by a cache implementation. The verifier never fails a
/// verification because of one of these; they are logged and the resolution
/// falls back to a fresh fetch.
pub type CacheError = Box<dyn std::error::Error + Send + Sync>;

/// Cache key for a signing certificate, `googlePublicKey-{kid}`.
pub fn cache_key(kid: &str) -> String {
    format!("googlePublicKey-{kid}")
}

/// Async key-value store with put-with-expiry semantics.
///
/// Writes are idempotent at the call sites in this crate: a `kid` always maps
/// to the same certificate until rotation, so concurrent verifications racing
/// to populate the same key are safe without locking.
#[async_trait]
pub trait KeyCache: Send + Sync {
    /// Look up a previously stored value. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// In-process [`KeyCache`] backed by a `HashMap`.
///
/// Suitable for single-instance deployments and tests. TTL is enforced on
/// read; expired entries are swept on write.
#[derive(Debug, Default)]
pub struct MemoryKeyCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: SystemTime,
}

impl MemoryKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyCache for MemoryKeyCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > SystemTime::now())
            .map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        let now = SystemTime::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_owned(),
            CacheEntry {
                value: value.to_owned(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
