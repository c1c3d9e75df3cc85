//! Bounded ring buffer of analytics events
//!
//! Distinct from [`crate::RoutingArtifact`]: an artifact is the audit trail
//! of one routing decision (cache hit, budget reject, cascade step), while
//! an analytics event is the lighter-weight outcome record of a completed
//! pipeline run, kept for the dashboard's traffic/latency/cost views rather
//! than per-decision forensics. Same ring-buffer-behind-a-mutex shape as
//! [`crate::ArtifactStore`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cascadeflow_core::time::{now, to_epoch_millis};
use cascadeflow_core::{EventId, QueryId, new_id};
use cascadeflow_events::{Channel, EventHub};

const DEFAULT_CAPACITY: usize = 5000;

/// What kind of pipeline outcome produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEventType {
    CacheHit,
    BudgetReject,
    QuerySucceeded,
    QueryFailed,
}

impl AnalyticsEventType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::BudgetReject => "budget_reject",
            Self::QuerySucceeded => "query_succeeded",
            Self::QueryFailed => "query_failed",
        }
    }
}

/// One completed `process_query` run, independent of whatever
/// [`crate::RoutingArtifact`] records were also recorded along the way
#[derive(Debug, Clone)]
pub struct AnalyticsEvent {
    pub id: EventId,
    pub query_id: QueryId,
    pub epoch_ms: i64,
    pub event_type: AnalyticsEventType,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub cost: f64,
    pub latency_ms: u64,
    pub cache_hit: bool,
}

/// Rolled-up view over the analytics ring buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsSummary {
    pub total_events: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub cache_hit_count: usize,
    pub total_cost: f64,
    pub average_latency_ms: f64,
}

struct State {
    buffer: VecDeque<AnalyticsEvent>,
    capacity: usize,
}

/// Handle to the shared ring buffer. Cheap to clone; clones share one store.
#[derive(Clone)]
pub struct AnalyticsStore {
    state: Arc<Mutex<State>>,
    events: Arc<EventHub>,
}

impl AnalyticsStore {
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

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        query_id: QueryId,
        event_type: AnalyticsEventType,
        provider: Option<String>,
        model: Option<String>,
        cost: f64,
        latency_ms: u64,
        cache_hit: bool,
    ) -> AnalyticsEvent {
        let event = AnalyticsEvent {
            id: new_id(),
            query_id,
            epoch_ms: to_epoch_millis(now()),
            event_type,
            provider,
            model,
            cost,
            latency_ms,
            cache_hit,
        };

        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.buffer.push_front(event.clone());
        if state.buffer.len() > state.capacity {
            state.buffer.pop_back();
        }
        drop(state);

        self.events.publish(
            Channel::Event,
            "analytics_event",
            serde_json::json!({
                "id": event.id.to_string(),
                "queryId": event.query_id.to_string(),
                "type": event.event_type.as_str(),
                "epochMs": event.epoch_ms,
            }),
        );

        event
    }

    pub fn get_recent(&self, n: usize) -> Vec<AnalyticsEvent> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.buffer.iter().take(n).cloned().collect()
    }

    pub fn get_summary(&self) -> AnalyticsSummary {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut success_count = 0;
        let mut failure_count = 0;
        let mut cache_hit_count = 0;
        let mut total_cost = 0.0;
        let mut latency_sum = 0u64;

        for event in &state.buffer {
            match event.event_type {
                AnalyticsEventType::QuerySucceeded => success_count += 1,
                AnalyticsEventType::QueryFailed | AnalyticsEventType::BudgetReject => failure_count += 1,
                AnalyticsEventType::CacheHit => {}
            }
            if event.cache_hit {
                cache_hit_count += 1;
            }
            total_cost += event.cost;
            latency_sum += event.latency_ms;
        }

        let total_events = state.buffer.len();
        AnalyticsSummary {
            total_events,
            success_count,
            failure_count,
            cache_hit_count,
            total_cost,
            average_latency_ms: if total_events == 0 { 0.0 } else { latency_sum as f64 / total_events as f64 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_trims_to_capacity() {
        let store = AnalyticsStore::with_capacity(Arc::new(EventHub::new()), 3);
        for _ in 0..5 {
            store.record(new_id(), AnalyticsEventType::QuerySucceeded, Some("openai".to_owned()), Some("gpt-4o".to_owned()), 0.01, 50, false);
        }
        assert_eq!(store.get_recent(10).len(), 3);
    }

    #[test]
    fn summary_tallies_by_event_type() {
        let store = AnalyticsStore::new(Arc::new(EventHub::new()));
        store.record(new_id(), AnalyticsEventType::CacheHit, None, None, 0.0, 5, true);
        store.record(new_id(), AnalyticsEventType::QuerySucceeded, Some("openai".to_owned()), Some("gpt-4o".to_owned()), 0.02, 400, false);
        store.record(new_id(), AnalyticsEventType::QueryFailed, None, None, 0.0, 10, false);

        let summary = store.get_summary();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failure_count, 1);
        assert_eq!(summary.cache_hit_count, 1);
        assert!((summary.total_cost - 0.02).abs() < 1e-9);
    }
}
