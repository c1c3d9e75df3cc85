//! Storage adapter trait and its in-memory default implementation
//!
//! Mirrors the split the gateway draws in `synapse-cache::ResponseCache`
//! between a concrete storage client and the pure helpers (`compute_cache_key`,
//! `is_cacheable`) layered on top — except here the storage client is a
//! trait, so the semantic-scan core in [`super::SemanticCache`] is agnostic
//! to whether entries live in memory or (eventually) a Valkey/Redis deployment.

use async_trait::async_trait;
use cascadeflow_core::time::now;
use dashmap::DashMap;
use jiff::Timestamp;

use crate::error::CacheError;

/// One stored cache entry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub hash: String,
    pub query_text: String,
    pub response: String,
    pub hit_count: u64,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl CacheEntry {
    #[must_use]
    pub fn is_expired(&self, at: Timestamp) -> bool {
        self.expires_at <= at
    }
}

/// Pluggable cache storage adapter
///
/// Implementations report storage-layer failures via [`CacheError`]; the
/// semantic core converts any `Err` into a miss rather than failing the
/// request.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, hash: &str) -> Result<Option<CacheEntry>, CacheError>;
    async fn set(&self, entry: CacheEntry) -> Result<(), CacheError>;
    async fn delete(&self, hash: &str) -> Result<(), CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
    async fn size(&self) -> Result<usize, CacheError>;
    /// All non-expired entries, for the semantic scan and for introspection endpoints
    async fn entries(&self) -> Result<Vec<CacheEntry>, CacheError>;
}

/// In-memory backend, keyed by exact hash
#[derive(Default)]
pub struct MemoryCacheBackend {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl MemoryCacheBackend {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    /// Evict one entry by (hitCount ascending, createdAt ascending) if at capacity
    fn evict_if_full(&self) {
        if self.entries.len() < self.max_entries {
            return;
        }
        let victim = self
            .entries
            .iter()
            .min_by(|a, b| {
                a.hit_count
                    .cmp(&b.hit_count)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            })
            .map(|entry| entry.key().clone());

        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, hash: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.get(hash).map(|e| e.value().clone()))
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        if !self.entries.contains_key(&entry.hash) {
            self.evict_if_full();
        }
        self.entries.insert(entry.hash.clone(), entry);
        Ok(())
    }

    async fn delete(&self, hash: &str) -> Result<(), CacheError> {
        self.entries.remove(hash);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }

    async fn size(&self) -> Result<usize, CacheError> {
        Ok(self.entries.len())
    }

    async fn entries(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let now = now();
        Ok(self
            .entries
            .iter()
            .filter(|e| !e.is_expired(now))
            .map(|e| e.value().clone())
            .collect())
    }
}
