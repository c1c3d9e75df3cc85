//! Per-strategy model/chain selection
//!
//! One function per strategy, the way the gateway's
//! `synapse-routing::strategy::{cost, cascade, threshold}` modules each
//! expose a free `route()` function; [`super::router::route`] is the thin
//! dispatcher that picks which one runs, mirroring the gateway's
//! `Strategy` trait wrappers without the indirection of a trait object per
//! strategy (each strategy here needs a distinct input shape — a single
//! remaining-budget figure for emergency, none at all for priority — so a
//! shared trait would just be a closure in a coat).

use cascadeflow_classifier::{ClassifiedQuery, Complexity, Intent};
use cascadeflow_costbook::{Capability, CostBook, estimate_output_tokens};

use crate::decision::{CascadeStep, RoutingDecision, StrategyKind};
use crate::error::RoutingError;

fn estimated_cost_for(costbook: &CostBook, provider: &str, model: &str, query: &ClassifiedQuery) -> f64 {
    let out_tok = estimate_output_tokens(query.complexity, query.estimated_tokens);
    costbook.estimate_cost(provider, model, query.estimated_tokens, out_tok).estimated_cost
}


/// branching table: realtime/search -> web_search, reasoning -> reasoning,
/// code -> code, complex -> highest quality, else cheapest suitable
pub fn priority(costbook: &CostBook, query: &ClassifiedQuery) -> Result<RoutingDecision, RoutingError> {
    let by_cost_head = || {
        costbook
            .list_models_by_cost(query.complexity, query.estimated_tokens, 0)
            .into_iter()
            .next()
            .map(|(profile, _)| profile)
    };

    let candidate = if query.is_realtime || query.intent == Intent::Search {
        costbook.with_capability(query.complexity, Capability::WebSearch).into_iter().next().cloned()
    } else if query.intent == Intent::Reasoning {
        costbook.with_capability(query.complexity, Capability::Reasoning).into_iter().next().cloned()
    } else if query.intent == Intent::Code {
        costbook.with_capability(query.complexity, Capability::Code).into_iter().next().cloned()
    } else if query.complexity == Complexity::Complex {
        costbook.by_quality(query.complexity).into_iter().next().cloned()
    } else {
        by_cost_head()
    }
    .or_else(by_cost_head)
    .ok_or(RoutingError::NoSuitableModel)?;

    let estimated_cost = estimated_cost_for(costbook, &candidate.provider, &candidate.model, query);
    let reasoning = candidate.capabilities.contains(&Capability::Reasoning);
    Ok(RoutingDecision {
        provider: candidate.provider.clone(),
        model: candidate.model.clone(),
        strategy: StrategyKind::Priority,
        reason: "priority branching table".to_owned(),
        estimated_cost,
        cascade_chain: None,
        emergency_mode: false,
        reasoning,
    })
}

/// cost book ranking, filtered to `web_search` first when realtime/search
pub fn cost_optimized(costbook: &CostBook, query: &ClassifiedQuery) -> Result<RoutingDecision, RoutingError> {
    let out_tok = estimate_output_tokens(query.complexity, query.estimated_tokens);
    let ranked = costbook.list_models_by_cost(query.complexity, query.estimated_tokens, out_tok);

    let head = if query.is_realtime || query.intent == Intent::Search {
        ranked
            .iter()
            .find(|(profile, _)| profile.capabilities.contains(&Capability::WebSearch))
            .or_else(|| ranked.first())
    } else {
        ranked.first()
    }
    .ok_or(RoutingError::NoSuitableModel)?;

    Ok(RoutingDecision {
        provider: head.0.provider.clone(),
        model: head.0.model.clone(),
        strategy: StrategyKind::CostOptimized,
        reason: "cheapest suitable model by cost book ranking".to_owned(),
        estimated_cost: head.1.estimated_cost,
        cascade_chain: None,
        emergency_mode: false,
        reasoning: head.0.capabilities.contains(&Capability::Reasoning),
    })
}

/// fixed three-tier ladder by complexity; realtime pins tier 1 to web_search
pub fn cascade(costbook: &CostBook, query: &ClassifiedQuery) -> Result<RoutingDecision, RoutingError> {
    let ranked = costbook.list_models_by_cost(query.complexity, query.estimated_tokens, 0);
    if ranked.is_empty() {
        return Err(RoutingError::NoSuitableModel);
    }

    let tier1 = if query.is_realtime {
        ranked
            .iter()
            .find(|(profile, _)| profile.capabilities.contains(&Capability::WebSearch))
            .unwrap_or(&ranked[0])
    } else {
        &ranked[0]
    };

    let thresholds = cascade_thresholds(query.complexity);
    let mut chain = vec![CascadeStep {
        provider: tier1.0.provider.clone(),
        model: tier1.0.model.clone(),
        quality_threshold: thresholds[0],
        max_cost: tier1.1.estimated_cost,
        reasoning: tier1.0.capabilities.contains(&Capability::Reasoning),
    }];

    for (profile, estimate) in ranked.iter().skip(1).take(2) {
        let index = chain.len();
        chain.push(CascadeStep {
            provider: profile.provider.clone(),
            model: profile.model.clone(),
            quality_threshold: thresholds.get(index).copied().unwrap_or(9.0),
            max_cost: estimate.estimated_cost,
            reasoning: profile.capabilities.contains(&Capability::Reasoning),
        });
    }

    let estimated_cost = chain[0].max_cost;
    let reasoning = chain[0].reasoning;
    Ok(RoutingDecision {
        provider: chain[0].provider.clone(),
        model: chain[0].model.clone(),
        strategy: StrategyKind::Cascade,
        reason: "three-tier cascade ladder".to_owned(),
        estimated_cost,
        cascade_chain: Some(chain),
        emergency_mode: false,
        reasoning,
    })
}

fn cascade_thresholds(complexity: Complexity) -> [f64; 3] {
    match complexity {
        Complexity::Simple => [6.0, 7.5, 9.0],
        Complexity::Medium => [7.0, 8.0, 9.0],
        Complexity::Complex => [7.5, 8.5, 9.5],
    }
}

/// cheapest model within `daily_remaining`; falls back to the hardcoded cheapest model
pub fn emergency(costbook: &CostBook, query: &ClassifiedQuery, daily_remaining: f64) -> Result<RoutingDecision, RoutingError> {
    let out_tok = estimate_output_tokens(query.complexity, query.estimated_tokens);

    let chosen = costbook
        .cheapest_model_within_budget(query.complexity, query.estimated_tokens, out_tok, daily_remaining)
        .or_else(|| {
            costbook
                .list_models_by_cost(query.complexity, query.estimated_tokens, out_tok)
                .into_iter()
                .next()
                .map(|(profile, _)| profile)
        })
        .ok_or(RoutingError::NoSuitableModel)?;

    let estimated_cost = estimated_cost_for(costbook, &chosen.provider, &chosen.model, query);
    Ok(RoutingDecision {
        provider: chosen.provider.clone(),
        model: chosen.model.clone(),
        strategy: StrategyKind::Emergency,
        reason: "emergency mode: cheapest model within remaining budget".to_owned(),
        estimated_cost,
        cascade_chain: None,
        emergency_mode: true,
        reasoning: chosen.capabilities.contains(&Capability::Reasoning),
    })
}
