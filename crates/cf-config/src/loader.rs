use std::path::Path;

use crate::Config;
use crate::cache::CacheAdapter;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, deserializes,
    /// then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate cross-field invariants `serde` cannot express on its own
    ///
    /// # Errors
    ///
    /// Returns an error if a threshold is out of range or an unimplemented
    /// cache adapter is selected.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_routing()?;
        self.validate_budget()?;
        self.validate_cache()?;
        Ok(())
    }

    fn validate_routing(&self) -> anyhow::Result<()> {
        let t = &self.routing.complexity_thresholds;
        if !(0.0..=1.0).contains(&t.medium) || !(0.0..=1.0).contains(&t.complex) {
            anyhow::bail!("routing.complexity_thresholds must lie in [0, 1]");
        }
        if t.medium > t.complex {
            anyhow::bail!("routing.complexity_thresholds.medium must not exceed .complex");
        }
        if !(0.0..=10.0).contains(&self.routing.cascade_min_quality) {
            anyhow::bail!("routing.cascade_min_quality must lie in [0, 10]");
        }
        Ok(())
    }

    fn validate_budget(&self) -> anyhow::Result<()> {
        if !(0.0..=100.0).contains(&self.budget.emergency_threshold) {
            anyhow::bail!("budget.emergency_threshold must lie in [0, 100]");
        }
        Ok(())
    }

    fn validate_cache(&self) -> anyhow::Result<()> {
        if self.cache.adapter == CacheAdapter::Redis {
            anyhow::bail!("cache.adapter = redis is accepted for forward compatibility but has no adapter implementation yet");
        }
        if !(0.0..=1.0).contains(&self.cache.similarity_threshold) {
            anyhow::bail!("cache.similarity_threshold must lie in [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        Config::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn inverted_complexity_thresholds_are_rejected() {
        let mut cfg = Config::default();
        cfg.routing.complexity_thresholds.medium = 0.9;
        cfg.routing.complexity_thresholds.complex = 0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn redis_adapter_is_rejected_until_implemented() {
        let mut cfg = Config::default();
        cfg.cache.adapter = CacheAdapter::Redis;
        assert!(cfg.validate().is_err());
    }
}
