//! Rolling-period spend ceilings and the emergency-mode trigger

use serde::Deserialize;

/// Budget ceilings and the percent-used threshold that latches emergency mode
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetConfig {
    #[serde(default)]
    pub daily: Option<PeriodLimit>,
    #[serde(default)]
    pub weekly: Option<PeriodLimit>,
    #[serde(default)]
    pub monthly: Option<PeriodLimit>,
    /// Percent-used (0-100) at which emergency mode latches
    #[serde(default = "default_emergency_threshold")]
    pub emergency_threshold: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily: None,
            weekly: None,
            monthly: None,
            emergency_threshold: default_emergency_threshold(),
        }
    }
}

const fn default_emergency_threshold() -> f64 {
    90.0
}

/// One period's spend ceiling
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodLimit {
    pub limit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_threshold_defaults_to_ninety_percent() {
        assert_eq!(BudgetConfig::default().emergency_threshold, 90.0);
    }
}
