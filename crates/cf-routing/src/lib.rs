//! Strategy dispatch over the cost book: turn a classified query (and the
//! current budget state) into a [`RoutingDecision`], then optionally drive
//! a cascade chain to completion.
//!
//! Grounded in the gateway's `synapse-routing` crate: a registry of
//! strategies selected by name, a cascade executor underneath the
//! threshold-escalation strategy, and pure selection logic kept separate
//! from the provider I/O that executes a decision.

#![allow(clippy::must_use_candidate)]

mod cascade;
mod decision;
mod error;
mod strategy;

use cascadeflow_classifier::ClassifiedQuery;
use cascadeflow_costbook::CostBook;

pub use cascade::{CascadeAttempt, CascadeOutcome, run_cascade};
pub use decision::{CascadeStep, RoutingDecision, StrategyKind};
pub use error::RoutingError;

/// Caller-selected strategy override, or `None` to use the default (cascade)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOverride {
    Priority,
    CostOptimized,
    Cascade,
}

/// Produce a [`RoutingDecision`] for one classified query.
///
/// Emergency mode (budget exhausted) always wins regardless of caller
/// preference; otherwise `preferred` is honored, falling back to the
/// cascade strategy when unset.
pub fn route(
    costbook: &CostBook,
    query: &ClassifiedQuery,
    preferred: Option<StrategyOverride>,
    emergency_mode: bool,
    daily_remaining: f64,
) -> Result<RoutingDecision, RoutingError> {
    if emergency_mode {
        return strategy::emergency(costbook, query, daily_remaining);
    }

    match preferred {
        Some(StrategyOverride::Priority) => strategy::priority(costbook, query),
        Some(StrategyOverride::CostOptimized) => strategy::cost_optimized(costbook, query),
        Some(StrategyOverride::Cascade) | None => strategy::cascade(costbook, query),
    }
}

/// Re-route away from a provider that emergency mode has disabled after the
/// fact, by re-running [`route`] in forced emergency mode.
pub fn reroute_for_disabled_provider(
    costbook: &CostBook,
    query: &ClassifiedQuery,
    daily_remaining: f64,
) -> Result<RoutingDecision, RoutingError> {
    strategy::emergency(costbook, query, daily_remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascadeflow_classifier::{ClassifierConfig, classify_query};
    use cascadeflow_costbook::{Capability, ComplexityKey, ModelCostProfile};
    use std::collections::BTreeSet;

    fn book() -> CostBook {
        CostBook::new(vec![
            ModelCostProfile {
                provider: "perplexity".to_owned(),
                model: "sonar".to_owned(),
                input_cost_per_1k: 0.001,
                output_cost_per_1k: 0.001,
                per_request_cost: 0.0,
                context_window: 128_000,
                max_output_tokens: 4096,
                suitable_for: [ComplexityKey::Simple, ComplexityKey::Medium, ComplexityKey::Complex]
                    .into_iter()
                    .collect(),
                capabilities: [Capability::WebSearch].into_iter().collect(),
                quality: 0.6,
            },
            ModelCostProfile {
                provider: "openai".to_owned(),
                model: "gpt-4o-mini".to_owned(),
                input_cost_per_1k: 0.002,
                output_cost_per_1k: 0.004,
                per_request_cost: 0.0,
                context_window: 128_000,
                max_output_tokens: 8192,
                suitable_for: [ComplexityKey::Simple, ComplexityKey::Medium, ComplexityKey::Complex]
                    .into_iter()
                    .collect(),
                capabilities: BTreeSet::new(),
                quality: 0.8,
            },
            ModelCostProfile {
                provider: "openai".to_owned(),
                model: "gpt-4o".to_owned(),
                input_cost_per_1k: 0.0025,
                output_cost_per_1k: 0.01,
                per_request_cost: 0.0,
                context_window: 128_000,
                max_output_tokens: 16_384,
                suitable_for: [ComplexityKey::Simple, ComplexityKey::Medium, ComplexityKey::Complex]
                    .into_iter()
                    .collect(),
                capabilities: [Capability::Reasoning, Capability::Code].into_iter().collect(),
                quality: 0.95,
            },
        ])
    }

    #[test]
    fn emergency_mode_overrides_any_preferred_strategy() {
        let q = classify_query("What is the current Bitcoin price?", &ClassifierConfig::default());
        let decision = route(&book(), &q, Some(StrategyOverride::Priority), true, 0.05).expect("should route");
        assert_eq!(decision.strategy, StrategyKind::Emergency);
        assert!(decision.emergency_mode);
    }

    #[test]
    fn default_strategy_is_cascade_with_a_nonempty_chain() {
        let q = classify_query("Explain how a hash map resolves collisions", &ClassifierConfig::default());
        let decision = route(&book(), &q, None, false, 100.0).expect("should route");
        assert_eq!(decision.strategy, StrategyKind::Cascade);
        assert!(decision.cascade_chain.as_ref().is_some_and(|c| !c.is_empty()));
    }

    #[test]
    fn priority_routes_realtime_search_to_web_search_capable_model() {
        let q = classify_query("What is the current Bitcoin price?", &ClassifierConfig::default());
        let decision = route(&book(), &q, Some(StrategyOverride::Priority), false, 100.0).expect("should route");
        assert_eq!(decision.provider, "perplexity");
    }

    #[test]
    fn cost_optimized_picks_cheapest_suitable_model() {
        let q = classify_query("hi", &ClassifierConfig::default());
        let decision = route(&book(), &q, Some(StrategyOverride::CostOptimized), false, 100.0).expect("should route");
        assert_eq!(decision.provider, "perplexity");
    }
}
