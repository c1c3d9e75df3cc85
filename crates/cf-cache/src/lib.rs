//! Pluggable semantic response cache
//!
//! Layers a SHA-256 exact-match lookup and a cosine-similarity fallback scan
//! on top of a pluggable [`CacheBackend`], the way the gateway layers
//! `compute_cache_key`/`is_cacheable` on top of `ResponseCache`. Storage
//! failures are logged and treated as misses; they never abort a request.

#![allow(clippy::must_use_candidate)]

mod backend;
mod error;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use cascadeflow_core::time::now;
use sha2::{Digest, Sha256};

pub use backend::{CacheBackend, CacheEntry, MemoryCacheBackend};
pub use error::CacheError;

/// Result of a successful cache lookup
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub entry: CacheEntry,
    pub similarity: f64,
}

/// Semantic cache core: exact-hash plus cosine-similarity fallback
pub struct SemanticCache<B: CacheBackend> {
    backend: B,
    similarity_threshold: f64,
    max_entries: usize,
    default_ttl: Duration,
}

/// Compute the lookup hash: SHA-256 of lowercased, trimmed text, 16 hex chars
#[must_use]
pub fn compute_hash(text: &str) -> String {
    let normalized = text.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!("{digest:x}")[..16].to_owned()
}

/// Lowercase, strip non-word characters, split on whitespace, drop tokens of length ≤ 1
fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|tok| tok.chars().count() > 1)
        .map(str::to_owned)
        .collect()
}

fn cosine_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);

    let vocab: HashSet<&str> = tokens_a.iter().chain(tokens_b.iter()).map(String::as_str).collect();
    if vocab.is_empty() {
        return 0.0;
    }

    let vec_a = count_vector(&tokens_a);
    let vec_b = count_vector(&tokens_b);

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for term in &vocab {
        let a_count = f64::from(*vec_a.get(*term).unwrap_or(&0));
        let b_count = f64::from(*vec_b.get(*term).unwrap_or(&0));
        dot += a_count * b_count;
        norm_a += a_count * a_count;
        norm_b += b_count * b_count;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn count_vector(tokens: &[String]) -> HashMap<&str, u32> {
    let mut counts = HashMap::new();
    for tok in tokens {
        *counts.entry(tok.as_str()).or_insert(0) += 1;
    }
    counts
}

impl<B: CacheBackend> SemanticCache<B> {
    pub fn new(backend: B, similarity_threshold: f64, max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            backend,
            similarity_threshold,
            max_entries,
            default_ttl,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Exact-hash lookup, then cosine-similarity fallback over all non-expired entries
    pub async fn lookup(&self, query_text: &str) -> Option<CacheHit> {
        let hash = compute_hash(query_text);
        let at = now();

        match self.backend.get(&hash).await {
            Ok(Some(mut entry)) if !entry.is_expired(at) => {
                entry.hit_count += 1;
                let persisted = entry.clone();
                if let Err(err) = self.backend.set(persisted).await {
                    tracing::warn!(%err, "cache hit-count persist failed");
                }
                return Some(CacheHit { entry, similarity: 1.0 });
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "cache backend read failed, treating as miss");
                return None;
            }
        }

        let entries = match self.backend.entries().await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(%err, "cache backend scan failed, treating as miss");
                return None;
            }
        };

        let best = entries
            .into_iter()
            .map(|entry| {
                let similarity = cosine_similarity(&entry.query_text, query_text);
                (entry, similarity)
            })
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let (mut entry, similarity) = best?;
        if similarity < self.similarity_threshold {
            return None;
        }

        entry.hit_count += 1;
        let persisted = entry.clone();
        if let Err(err) = self.backend.set(persisted).await {
            tracing::warn!(%err, "cache hit-count persist failed");
        }
        Some(CacheHit { entry, similarity })
    }

    /// Store a response, evicting under `max_entries` pressure (handled by the backend)
    pub async fn store(&self, query_text: &str, response: &str, ttl: Option<Duration>) {
        let hash = compute_hash(query_text);
        let at = now();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = at + jiff::SignedDuration::from_secs(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));

        let entry = CacheEntry {
            hash,
            query_text: query_text.to_owned(),
            response: response.to_owned(),
            hit_count: 0,
            created_at: at,
            expires_at,
        };

        if let Err(err) = self.backend.set(entry).await {
            tracing::warn!(%err, "cache store failed");
        }
    }

    /// Delete all entries whose `expires_at <= now`
    pub async fn prune_expired(&self) {
        let at = now();
        let Ok(entries) = self.backend.entries().await else {
            return;
        };
        for entry in entries {
            if entry.is_expired(at) {
                let _ = self.backend.delete(&entry.hash).await;
            }
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exact_match_hits_with_similarity_one() {
        let cache = SemanticCache::new(MemoryCacheBackend::new(100), 0.82, 100, Duration::from_secs(3600));
        cache.store("Explain quantum computing", "an explanation", None).await;

        let hit = cache.lookup("Explain quantum computing").await.expect("hit");
        assert_eq!(hit.similarity, 1.0);
        assert_eq!(hit.entry.hit_count, 1);
    }

    #[tokio::test]
    async fn near_duplicate_hits_via_cosine_similarity() {
        let cache = SemanticCache::new(MemoryCacheBackend::new(100), 0.82, 100, Duration::from_secs(3600));
        cache.store("Explain quantum computing", "an explanation", None).await;

        let hit = cache
            .lookup("explain quantum computing.")
            .await
            .expect("near-duplicate should hit");
        assert!(hit.similarity >= 0.82);
    }

    #[tokio::test]
    async fn dissimilar_query_misses() {
        let cache = SemanticCache::new(MemoryCacheBackend::new(100), 0.82, 100, Duration::from_secs(3600));
        cache.store("Explain quantum computing", "an explanation", None).await;

        assert!(cache.lookup("What is the weather today").await.is_none());
    }

    #[test]
    fn tokenizer_strips_punctuation_and_short_tokens() {
        let tokens = tokenize("Hi, a cat sat on a mat!");
        assert!(!tokens.contains(&"a".to_owned()));
        assert!(tokens.contains(&"cat".to_owned()));
    }
}
