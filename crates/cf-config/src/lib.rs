//! TOML-backed configuration for the routing core
//!
//! Follows the gateway's `synapse-config` layout: one module per concern,
//! `{{ env.VAR }}` placeholder expansion on the raw file text before
//! deserialization, `deny_unknown_fields` everywhere so a typo'd key fails
//! loudly instead of being silently ignored, and a `validate` pass that
//! checks cross-field invariants `serde` cannot express.

#![allow(clippy::must_use_candidate)]

pub mod budget;
pub mod cache;
mod env;
mod loader;
pub mod providers;
pub mod routing;
pub mod server;

use indexmap::IndexMap;
use serde::Deserialize;

pub use budget::BudgetConfig;
pub use cache::{CacheAdapter, CacheConfig};
pub use providers::ProviderConfig;
pub use routing::RoutingConfig;
pub use server::ServerConfig;

/// Top-level cascadeflow configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_loads_with_all_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.cache.adapter, CacheAdapter::Memory);
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn unknown_top_level_field_is_rejected() {
        let err = toml::from_str::<Config>("bogus = true").unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }
}
