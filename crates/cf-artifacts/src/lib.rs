//! Bounded ring buffer of immutable routing-decision artifacts
//!
//! Mutation discipline mirrors the gateway's billing `CircuitBreaker`:
//! one small struct holds every piece of mutable state behind a single
//! `Mutex`, and the public API is read/write methods on a `Clone`-able
//! handle rather than exposing the lock.

#![allow(clippy::must_use_candidate)]

mod analytics;

pub use analytics::{AnalyticsEvent, AnalyticsEventType, AnalyticsStore, AnalyticsSummary};

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use cascadeflow_classifier::Complexity;
use cascadeflow_core::time::{now, to_epoch_millis};
use cascadeflow_core::{ArtifactId, QueryId, new_id};
use cascadeflow_events::{Channel, EventHub};
use serde_json::Value;

const DEFAULT_CAPACITY: usize = 5000;

/// What kind of routing event produced an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactType {
    CacheHit,
    BudgetReject,
    RouteDecision,
    CascadeEscalation,
    CascadeSuccess,
}

impl ArtifactType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::BudgetReject => "budget_reject",
            Self::RouteDecision => "route_decision",
            Self::CascadeEscalation => "cascade_escalation",
            Self::CascadeSuccess => "cascade_success",
        }
    }
}

/// One step of a cascade chain, recorded for audit trails
#[derive(Debug, Clone)]
pub struct CascadeTrailEntry {
    pub provider: String,
    pub model: String,
    pub score: f64,
    pub index: usize,
}

/// Cache lookup detail attached to a `cache_hit` artifact
#[derive(Debug, Clone)]
pub struct CacheInfo {
    pub hash: String,
    pub similarity: f64,
}

/// One immutable (modulo `enrich_with_response`) routing record
#[derive(Debug, Clone)]
pub struct RoutingArtifact {
    pub id: ArtifactId,
    pub query_id: QueryId,
    pub epoch_ms: i64,
    pub artifact_type: ArtifactType,
    pub complexity: Option<Complexity>,
    pub selected_model: Option<String>,
    pub estimated_cost: f64,
    pub actual_cost: Option<f64>,
    pub confidence: f64,
    pub reasoning: String,
    pub cascade_trail: Vec<CascadeTrailEntry>,
    pub quality: Option<Value>,
    pub cache_info: Option<CacheInfo>,
    pub budget_snapshot: Option<Value>,
    pub response_info: Option<Value>,
    pub tags: BTreeSet<String>,
}

/// Rolled-up view returned by `get_summary`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtifactSummary {
    pub today_count: usize,
    pub total_cost_today: f64,
    pub cascade_escalation_count: usize,
    pub cache_hit_count: usize,
    pub average_confidence: f64,
}

struct State {
    buffer: VecDeque<RoutingArtifact>,
    capacity: usize,
}

/// Handle to the shared ring buffer. Cheap to clone; clones share one store.
#[derive(Clone)]
pub struct ArtifactStore {
    state: Arc<Mutex<State>>,
    events: Arc<EventHub>,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(events: Arc<EventHub>) -> Self {
        Self::with_capacity(events, DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(events: Arc<EventHub>, capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                buffer: VecDeque::with_capacity(capacity.min(1024)),
                capacity,
            })),
            events,
        }
    }

    fn record(&self, artifact: RoutingArtifact) -> RoutingArtifact {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.buffer.push_front(artifact.clone());
        if state.buffer.len() > state.capacity {
            state.buffer.pop_back();
        }
        drop(state);

        self.events.publish(
            Channel::Event,
            artifact.artifact_type.as_str(),
            serde_json::json!({
                "id": artifact.id.to_string(),
                "queryId": artifact.query_id.to_string(),
                "epochMs": artifact.epoch_ms,
            }),
        );

        artifact
    }

    fn base(query_id: QueryId, artifact_type: ArtifactType, reasoning: impl Into<String>) -> RoutingArtifact {
        RoutingArtifact {
            id: new_id(),
            query_id,
            epoch_ms: to_epoch_millis(now()),
            artifact_type,
            complexity: None,
            selected_model: None,
            estimated_cost: 0.0,
            actual_cost: None,
            confidence: 0.0,
            reasoning: reasoning.into(),
            cascade_trail: Vec::new(),
            quality: None,
            cache_info: None,
            budget_snapshot: None,
            response_info: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn record_cache_hit(&self, query_id: QueryId, hash: String, similarity: f64) -> RoutingArtifact {
        let mut artifact = Self::base(query_id, ArtifactType::CacheHit, "served from semantic cache");
        artifact.confidence = similarity;
        artifact.cache_info = Some(CacheInfo { hash, similarity });
        artifact.tags.insert("cache".to_owned());
        self.record(artifact)
    }

    pub fn record_budget_reject(&self, query_id: QueryId, budget_snapshot: Value) -> RoutingArtifact {
        let mut artifact = Self::base(query_id, ArtifactType::BudgetReject, "daily budget exhausted");
        artifact.budget_snapshot = Some(budget_snapshot);
        artifact.tags.insert("budget".to_owned());
        self.record(artifact)
    }

    pub fn record_route_decision(
        &self,
        query_id: QueryId,
        complexity: Complexity,
        selected_model: String,
        estimated_cost: f64,
        reasoning: impl Into<String>,
    ) -> RoutingArtifact {
        let mut artifact = Self::base(query_id, ArtifactType::RouteDecision, reasoning);
        artifact.complexity = Some(complexity);
        artifact.selected_model = Some(selected_model);
        artifact.estimated_cost = estimated_cost;
        self.record(artifact)
    }

    pub fn record_cascade_escalation(
        &self,
        query_id: QueryId,
        from: CascadeTrailEntry,
        to: CascadeTrailEntry,
    ) -> RoutingArtifact {
        let mut artifact = Self::base(
            query_id,
            ArtifactType::CascadeEscalation,
            format!("escalated {}/{} -> {}/{}", from.provider, from.model, to.provider, to.model),
        );
        artifact.cascade_trail = vec![from, to];
        artifact.tags.insert("cascade".to_owned());
        self.record(artifact)
    }

    pub fn record_cascade_success(
        &self,
        query_id: QueryId,
        step: CascadeTrailEntry,
        trail: Vec<CascadeTrailEntry>,
    ) -> RoutingArtifact {
        let mut artifact = Self::base(
            query_id,
            ArtifactType::CascadeSuccess,
            format!("accepted {}/{} at step {}", step.provider, step.model, step.index),
        );
        artifact.confidence = step.score / 10.0;
        artifact.selected_model = Some(format!("{}/{}", step.provider, step.model));
        artifact.cascade_trail = trail;
        artifact.tags.insert("cascade".to_owned());
        self.record(artifact)
    }

    /// The sole permitted in-place mutation: attach realized cost and response detail
    pub fn enrich_with_response(
        &self,
        id: ArtifactId,
        actual_cost: f64,
        response_info: Value,
        quality: Option<Value>,
        confidence: Option<f64>,
    ) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(artifact) = state.buffer.iter_mut().find(|a| a.id == id) {
            artifact.actual_cost = Some(actual_cost);
            artifact.response_info = Some(response_info);
            if let Some(quality) = quality {
                artifact.quality = Some(quality);
            }
            if let Some(confidence) = confidence {
                artifact.confidence = confidence;
            }
        }
    }

    pub fn get_recent(&self, n: usize) -> Vec<RoutingArtifact> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.buffer.iter().take(n).cloned().collect()
    }

    pub fn get_by_query_id(&self, query_id: QueryId) -> Vec<RoutingArtifact> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.buffer.iter().filter(|a| a.query_id == query_id).cloned().collect()
    }

    pub fn get_by_type(&self, artifact_type: ArtifactType, n: Option<usize>) -> Vec<RoutingArtifact> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let iter = state.buffer.iter().filter(|a| a.artifact_type == artifact_type).cloned();
        match n {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    pub fn get_by_tag(&self, tag: &str, n: Option<usize>) -> Vec<RoutingArtifact> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let iter = state.buffer.iter().filter(|a| a.tags.contains(tag)).cloned();
        match n {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    pub fn get_by_time_range(&self, start_ms: i64, end_ms: i64) -> Vec<RoutingArtifact> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state
            .buffer
            .iter()
            .filter(|a| a.epoch_ms >= start_ms && a.epoch_ms < end_ms)
            .cloned()
            .collect()
    }

    pub fn get_summary(&self) -> ArtifactSummary {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let today_start = to_epoch_millis(now()) - 24 * 60 * 60 * 1000;

        let mut today_count = 0;
        let mut total_cost_today = 0.0;
        let mut cascade_escalation_count = 0;
        let mut cache_hit_count = 0;
        let mut confidence_sum = 0.0;
        let mut confidence_n = 0usize;

        for artifact in &state.buffer {
            if artifact.epoch_ms >= today_start {
                today_count += 1;
                total_cost_today += artifact.actual_cost.or(Some(artifact.estimated_cost)).unwrap_or(0.0);
            }
            if artifact.artifact_type == ArtifactType::CascadeEscalation {
                cascade_escalation_count += 1;
            }
            if artifact.artifact_type == ArtifactType::CacheHit {
                cache_hit_count += 1;
            }
            confidence_sum += artifact.confidence;
            confidence_n += 1;
        }

        ArtifactSummary {
            today_count,
            total_cost_today,
            cascade_escalation_count,
            cache_hit_count,
            average_confidence: if confidence_n == 0 { 0.0 } else { confidence_sum / confidence_n as f64 },
        }
    }

    /// Also used by `counts by type` in the manager-view endpoint
    pub fn counts_by_type(&self) -> HashMap<&'static str, usize> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut counts = HashMap::new();
        for artifact in &state.buffer {
            *counts.entry(artifact.artifact_type.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascadeflow_core::new_id;

    #[test]
    fn ring_buffer_trims_to_capacity() {
        let store = ArtifactStore::with_capacity(Arc::new(EventHub::new()), 3);
        for _ in 0..5 {
            store.record_cache_hit(new_id(), "abc".to_owned(), 1.0);
        }
        assert_eq!(store.get_recent(10).len(), 3);
    }

    #[test]
    fn enrich_with_response_is_the_only_mutation() {
        let store = ArtifactStore::new(Arc::new(EventHub::new()));
        let query_id = new_id();
        let artifact = store.record_route_decision(query_id, Complexity::Simple, "anthropic/claude-haiku".to_owned(), 0.01, "cheapest");

        store.enrich_with_response(artifact.id, 0.009, serde_json::json!({"tokens": 42}), None, Some(0.9));

        let fetched = store.get_by_query_id(query_id);
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].actual_cost, Some(0.009));
        assert_eq!(fetched[0].confidence, 0.9);
    }

    #[test]
    fn summary_counts_cache_hits_and_escalations() {
        let store = ArtifactStore::new(Arc::new(EventHub::new()));
        store.record_cache_hit(new_id(), "h".to_owned(), 1.0);
        store.record_cascade_escalation(
            new_id(),
            CascadeTrailEntry { provider: "perplexity".to_owned(), model: "sonar".to_owned(), score: 6.5, index: 0 },
            CascadeTrailEntry { provider: "openai".to_owned(), model: "gpt-4o-mini".to_owned(), score: 9.0, index: 1 },
        );

        let summary = store.get_summary();
        assert_eq!(summary.cache_hit_count, 1);
        assert_eq!(summary.cascade_escalation_count, 1);
    }
}
