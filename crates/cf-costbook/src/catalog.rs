//! Built-in model pricing/capability catalog
//!
//! The spec's configuration schema gates only which `providers.<name>` are
//! enabled and which of their models may be served (§6); it carries no
//! per-model pricing fields, unlike the gateway's `synapse-routing::registry`
//! which loads a `ModelProfileConfig` list straight from TOML. So this is
//! the fixed catalog the binary filters against a config's enabled
//! providers/models at startup, rather than a registry hydrated from config.

use std::collections::BTreeSet;

use crate::{Capability, ComplexityKey, ModelCostProfile};

fn profile(
    provider: &str,
    model: &str,
    input_cost_per_1k: f64,
    output_cost_per_1k: f64,
    context_window: u32,
    max_output_tokens: u32,
    suitable_for: &[ComplexityKey],
    capabilities: &[Capability],
    quality: f64,
) -> ModelCostProfile {
    ModelCostProfile {
        provider: provider.to_owned(),
        model: model.to_owned(),
        input_cost_per_1k,
        output_cost_per_1k,
        per_request_cost: 0.0,
        context_window,
        max_output_tokens,
        suitable_for: suitable_for.iter().copied().collect::<BTreeSet<_>>(),
        capabilities: capabilities.iter().copied().collect::<BTreeSet<_>>(),
        quality,
    }
}

/// A representative catalog of current-generation provider/model profiles
#[must_use]
pub fn default_catalog() -> Vec<ModelCostProfile> {
    use Capability::{Code, LongContext, Reasoning, ToolCalling, Vision, WebSearch};
    use ComplexityKey::{Complex, Medium, Simple};

    vec![
        profile(
            "anthropic",
            "claude-haiku",
            0.0008,
            0.004,
            200_000,
            8192,
            &[Simple, Medium],
            &[ToolCalling],
            0.55,
        ),
        profile(
            "anthropic",
            "claude-sonnet",
            0.003,
            0.015,
            200_000,
            8192,
            &[Simple, Medium, Complex],
            &[ToolCalling, Vision, Reasoning, Code, LongContext],
            0.92,
        ),
        profile(
            "openai",
            "gpt-4o-mini",
            0.00015,
            0.0006,
            128_000,
            16_384,
            &[Simple, Medium],
            &[ToolCalling, Vision],
            0.65,
        ),
        profile(
            "openai",
            "gpt-4o",
            0.0025,
            0.01,
            128_000,
            16_384,
            &[Simple, Medium, Complex],
            &[ToolCalling, Vision, Reasoning, Code],
            0.9,
        ),
        profile(
            "perplexity",
            "sonar",
            0.001,
            0.001,
            128_000,
            4096,
            &[Simple, Medium, Complex],
            &[WebSearch],
            0.6,
        ),
        profile(
            "perplexity",
            "sonar-pro",
            0.003,
            0.015,
            200_000,
            8192,
            &[Simple, Medium, Complex],
            &[WebSearch, LongContext],
            0.78,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entries_are_unique_by_provider_and_model() {
        let catalog = default_catalog();
        let mut ids: Vec<String> = catalog.iter().map(ModelCostProfile::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }
}
