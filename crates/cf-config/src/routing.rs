//! Routing strategy selection and classifier threshold configuration

use serde::Deserialize;

/// Default strategy selection and classifier thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Strategy used when a request does not override it
    #[serde(default)]
    pub default_strategy: DefaultStrategy,
    /// Minimum score (0-10) a cascade step must clear to avoid escalation
    #[serde(default = "default_cascade_min_quality")]
    pub cascade_min_quality: f64,
    /// Classifier complexity thresholds
    #[serde(default)]
    pub complexity_thresholds: ComplexityThresholds,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_strategy: DefaultStrategy::default(),
            cascade_min_quality: default_cascade_min_quality(),
            complexity_thresholds: ComplexityThresholds::default(),
        }
    }
}

const fn default_cascade_min_quality() -> f64 {
    7.0
}

/// Strategy selected when a request does not override `strategy`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultStrategy {
    Priority,
    CostOptimized,
    #[default]
    Cascade,
}

/// Classifier complexity score thresholds, mirroring `ClassifierConfig`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplexityThresholds {
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_complex")]
    pub complex: f64,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            medium: default_medium(),
            complex: default_complex(),
        }
    }
}

const fn default_medium() -> f64 {
    0.30
}

const fn default_complex() -> f64 {
    0.70
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classifier_defaults() {
        let cfg = RoutingConfig::default();
        assert_eq!(cfg.complexity_thresholds.medium, 0.30);
        assert_eq!(cfg.complexity_thresholds.complex, 0.70);
    }
}
