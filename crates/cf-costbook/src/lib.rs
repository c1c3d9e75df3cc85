//! Static model cost registry and pure cost-estimation functions
//!
//! Generalizes the gateway's `synapse-routing::registry::ModelRegistry`
//! (config-driven profiles, sorted views) from a quality/cost ranking tool
//! into the full Cost Book: per-complexity output-token estimation, a
//! capability/complexity-aware cost ranking, and a budget-constrained
//! cheapest-model search.

#![allow(clippy::must_use_candidate)]

mod catalog;

use std::collections::BTreeSet;

use cascadeflow_classifier::Complexity;
use cascadeflow_core::money::round_tenth_cent;

pub use catalog::default_catalog;

/// A model capability relevant to routing eligibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    WebSearch,
    ToolCalling,
    Vision,
    LongContext,
    Reasoning,
    Code,
}

/// Process-lifetime constant describing one provider/model's pricing and fit
#[derive(Debug, Clone)]
pub struct ModelCostProfile {
    pub provider: String,
    pub model: String,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
    pub per_request_cost: f64,
    pub context_window: u32,
    pub max_output_tokens: u32,
    pub suitable_for: BTreeSet<ComplexityKey>,
    pub capabilities: BTreeSet<Capability>,
    /// Quality tier in `[0, 1]`, used by priority routing's "highest-tier" rule
    pub quality: f64,
}

/// `Complexity` wrapper that is `Ord`, so it can live in a `BTreeSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComplexityKey {
    Simple,
    Medium,
    Complex,
}

impl From<Complexity> for ComplexityKey {
    fn from(c: Complexity) -> Self {
        match c {
            Complexity::Simple => Self::Simple,
            Complexity::Medium => Self::Medium,
            Complexity::Complex => Self::Complex,
        }
    }
}

impl ModelCostProfile {
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

/// Breakdown of a [`CostEstimate`] into its input/output/flat components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub per_request_cost: f64,
}

/// Immutable, derived cost projection for one candidate model
#[derive(Debug, Clone)]
pub struct CostEstimate {
    pub provider: String,
    pub model: String,
    pub estimated_input_tokens: u32,
    pub estimated_output_tokens: u32,
    pub estimated_cost: f64,
    pub breakdown: CostBreakdown,
}

impl CostEstimate {
    fn zero(provider: &str, model: &str, in_tok: u32, out_tok: u32) -> Self {
        Self {
            provider: provider.to_owned(),
            model: model.to_owned(),
            estimated_input_tokens: in_tok,
            estimated_output_tokens: out_tok,
            estimated_cost: 0.0,
            breakdown: CostBreakdown {
                input_cost: 0.0,
                output_cost: 0.0,
                per_request_cost: 0.0,
            },
        }
    }
}

/// Static, process-lifetime registry of model cost profiles
#[derive(Debug, Default)]
pub struct CostBook {
    profiles: Vec<ModelCostProfile>,
}

impl CostBook {
    #[must_use]
    pub fn new(profiles: Vec<ModelCostProfile>) -> Self {
        Self { profiles }
    }

    #[must_use]
    pub fn profiles(&self) -> &[ModelCostProfile] {
        &self.profiles
    }

    fn find(&self, provider: &str, model: &str) -> Option<&ModelCostProfile> {
        self.profiles
            .iter()
            .find(|p| p.provider == provider && p.model == model)
    }

    /// Look up one provider/model's profile, e.g. to check its capabilities
    /// before picking a per-call timeout
    #[must_use]
    pub fn profile(&self, provider: &str, model: &str) -> Option<&ModelCostProfile> {
        self.find(provider, model)
    }

    /// Estimate cost for a specific provider/model pair
    ///
    /// A model absent from the registry yields a zero-cost sentinel rather
    /// than an error: callers that ranked a model out of stale config should
    /// not be penalized by an estimate that looks free.
    pub fn estimate_cost(&self, provider: &str, model: &str, in_tok: u32, out_tok: u32) -> CostEstimate {
        let Some(profile) = self.find(provider, model) else {
            return CostEstimate::zero(provider, model, in_tok, out_tok);
        };

        let input_cost = round_tenth_cent(f64::from(in_tok) / 1000.0 * profile.input_cost_per_1k);
        let output_cost = round_tenth_cent(f64::from(out_tok) / 1000.0 * profile.output_cost_per_1k);
        let per_request_cost = round_tenth_cent(profile.per_request_cost);
        let estimated_cost = round_tenth_cent(input_cost + output_cost + per_request_cost);

        CostEstimate {
            provider: provider.to_owned(),
            model: model.to_owned(),
            estimated_input_tokens: in_tok,
            estimated_output_tokens: out_tok,
            estimated_cost,
            breakdown: CostBreakdown {
                input_cost,
                output_cost,
                per_request_cost,
            },
        }
    }

    /// Models whose `suitable_for` includes `complexity`, ascending by cost
    #[must_use]
    pub fn list_models_by_cost(&self, complexity: Complexity, in_tok: u32, out_tok: u32) -> Vec<(ModelCostProfile, CostEstimate)> {
        let key = ComplexityKey::from(complexity);
        let mut ranked: Vec<_> = self
            .profiles
            .iter()
            .filter(|p| p.suitable_for.contains(&key))
            .map(|p| {
                let estimate = self.estimate_cost(&p.provider, &p.model, in_tok, out_tok);
                (p.clone(), estimate)
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.1.estimated_cost
                .partial_cmp(&b.1.estimated_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Models suitable for `complexity`, ordered by quality descending
    #[must_use]
    pub fn by_quality(&self, complexity: Complexity) -> Vec<&ModelCostProfile> {
        let key = ComplexityKey::from(complexity);
        let mut ranked: Vec<&ModelCostProfile> = self
            .profiles
            .iter()
            .filter(|p| p.suitable_for.contains(&key))
            .collect();
        ranked.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Models with `capability`, suitable for `complexity`, cheapest first
    #[must_use]
    pub fn with_capability(&self, complexity: Complexity, capability: Capability) -> Vec<&ModelCostProfile> {
        let key = ComplexityKey::from(complexity);
        let mut ranked: Vec<&ModelCostProfile> = self
            .profiles
            .iter()
            .filter(|p| p.suitable_for.contains(&key) && p.capabilities.contains(&capability))
            .collect();
        ranked.sort_by(|a, b| {
            a.input_cost_per_1k
                .partial_cmp(&b.input_cost_per_1k)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// First entry of the cost ranking whose estimate fits within `remaining`
    #[must_use]
    pub fn cheapest_model_within_budget(
        &self,
        complexity: Complexity,
        in_tok: u32,
        out_tok: u32,
        remaining: f64,
    ) -> Option<ModelCostProfile> {
        self.list_models_by_cost(complexity, in_tok, out_tok)
            .into_iter()
            .find(|(_, estimate)| estimate.estimated_cost <= remaining)
            .map(|(profile, _)| profile)
    }
}

/// `estimateOutputTokens(complexity, inTok)`
#[must_use]
pub fn estimate_output_tokens(complexity: Complexity, in_tok: u32) -> u32 {
    let in_tok = f64::from(in_tok);
    let (lo, hi, factor) = match complexity {
        Complexity::Simple => (50.0, 200.0, 2.0),
        Complexity::Medium => (200.0, 800.0, 3.0),
        Complexity::Complex => (500.0, 4000.0, 4.0),
    };
    let raw = (factor * in_tok).max(lo).min(hi);
    raw as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> CostBook {
        CostBook::new(vec![
            ModelCostProfile {
                provider: "anthropic".to_owned(),
                model: "claude-haiku".to_owned(),
                input_cost_per_1k: 0.001,
                output_cost_per_1k: 0.005,
                per_request_cost: 0.0,
                context_window: 200_000,
                max_output_tokens: 8192,
                suitable_for: [ComplexityKey::Simple, ComplexityKey::Medium].into_iter().collect(),
                capabilities: BTreeSet::new(),
                quality: 0.55,
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
                capabilities: [Capability::Vision, Capability::ToolCalling].into_iter().collect(),
                quality: 0.9,
            },
        ])
    }

    #[test]
    fn missing_model_is_zero_cost_sentinel() {
        let est = book().estimate_cost("nobody", "nothing", 100, 100);
        assert_eq!(est.estimated_cost, 0.0);
    }

    #[test]
    fn output_token_bounds_clamp_both_sides() {
        assert_eq!(estimate_output_tokens(Complexity::Simple, 10), 50);
        assert_eq!(estimate_output_tokens(Complexity::Simple, 1000), 200);
        assert_eq!(estimate_output_tokens(Complexity::Complex, 2000), 4000);
    }

    #[test]
    fn list_models_by_cost_is_ascending_and_filtered_by_suitability() {
        let ranked = book().list_models_by_cost(Complexity::Complex, 1000, 500);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0.model, "gpt-4o");
    }

    #[test]
    fn cheapest_within_budget_picks_first_affordable() {
        let cheapest = book()
            .cheapest_model_within_budget(Complexity::Medium, 1000, 500, 0.01)
            .expect("one model should fit");
        assert_eq!(cheapest.model, "claude-haiku");

        let none = book().cheapest_model_within_budget(Complexity::Medium, 1_000_000, 500_000, 0.0001);
        assert!(none.is_none());
    }
}
