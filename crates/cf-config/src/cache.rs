//! Semantic cache backend selection and tuning

use serde::Deserialize;

/// Cache backend selection and similarity/TTL tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default)]
    pub adapter: CacheAdapter,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    #[serde(default = "default_realtime_ttl_ms")]
    pub realtime_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            adapter: CacheAdapter::default(),
            similarity_threshold: default_similarity_threshold(),
            max_entries: default_max_entries(),
            ttl_ms: default_ttl_ms(),
            realtime_ttl_ms: default_realtime_ttl_ms(),
        }
    }
}

const fn default_similarity_threshold() -> f64 {
    0.92
}

const fn default_max_entries() -> usize {
    10_000
}

const fn default_ttl_ms() -> u64 {
    3_600_000
}

const fn default_realtime_ttl_ms() -> u64 {
    300_000
}

/// Cache storage backend. `Redis` is accepted by config but has no adapter
/// implementation yet; [`crate::Config::validate`] rejects it until one lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheAdapter {
    #[default]
    Memory,
    Redis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_adapter_is_memory() {
        assert_eq!(CacheConfig::default().adapter, CacheAdapter::Memory);
    }
}
