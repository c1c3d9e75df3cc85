//! Query orchestration: the single entry point tying every core crate
//! together into one request/response cycle.
//!
//! The pipeline itself has no gateway analogue as a single function; it
//! generalizes the shape of the gateway's `synapse-server` request handlers,
//! which thread a request through classification, cache, cost estimation,
//! and provider dispatch one step at a time rather than leaving that
//! sequencing to the HTTP layer.

#![allow(clippy::must_use_candidate)]

mod error;
mod registry;

use std::sync::Arc;
use std::time::Instant;

use cascadeflow_artifacts::{AnalyticsEventType, AnalyticsStore, ArtifactStore, CascadeTrailEntry};
use cascadeflow_budget::{ActualCost, BudgetTracker, Period};
use cascadeflow_cache::{CacheBackend, SemanticCache};
use cascadeflow_classifier::{ClassifiedQuery, ClassifierConfig, classify_query, should_skip_cache, suggest_cache_ttl};
use cascadeflow_core::time::now;
use cascadeflow_core::{QueryId, new_id};
use cascadeflow_costbook::CostBook;
use cascadeflow_events::{Channel, EventHub};
use cascadeflow_provider::{ChatRequest, ChatResponse};
use cascadeflow_quality::{Citation, QualityReport, ResponseMeta, assess};
use cascadeflow_routing::{RoutingDecision, StrategyKind, StrategyOverride, reroute_for_disabled_provider, route, run_cascade};

pub use error::OrchestratorError;
pub use registry::ProviderRegistry;

/// One incoming request
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub content: String,
    pub strategy_override: Option<StrategyOverride>,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub conversation_history: Vec<cascadeflow_provider::Message>,
}

/// Result of a completed `process_query` call
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub query_id: QueryId,
    pub content: String,
    pub provider: String,
    pub model: String,
    pub classification: ClassifiedQuery,
    pub routing: Option<RoutingDecision>,
    pub cost: f64,
    pub cache_hit: bool,
    pub similarity: Option<f64>,
    pub escalated: bool,
    pub total_time_ms: u64,
    pub tokens: Option<cascadeflow_provider::TokenUsage>,
    pub citations: Vec<cascadeflow_provider::ProviderCitation>,
}

/// Ties classification, cache, budget, routing, cascade execution, and
/// artifact/event recording together into one request lifecycle.
///
/// Generic over the cache backend the same way [`SemanticCache`] is, since
/// boxing [`CacheBackend`] would need an `impl CacheBackend for Box<dyn
/// CacheBackend>` shim this system has no other use for.
pub struct Orchestrator<B: CacheBackend> {
    classifier_config: ClassifierConfig,
    cache: SemanticCache<B>,
    budget: BudgetTracker,
    costbook: CostBook,
    artifacts: ArtifactStore,
    analytics: AnalyticsStore,
    events: Arc<EventHub>,
    providers: ProviderRegistry,
}

impl<B: CacheBackend> Orchestrator<B> {
    pub fn new(
        classifier_config: ClassifierConfig,
        cache: SemanticCache<B>,
        budget: BudgetTracker,
        costbook: CostBook,
        events: Arc<EventHub>,
        providers: ProviderRegistry,
    ) -> Self {
        let artifacts = ArtifactStore::new(events.clone());
        let analytics = AnalyticsStore::new(events.clone());
        Self {
            classifier_config,
            cache,
            budget,
            costbook,
            artifacts,
            analytics,
            events,
            providers,
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn analytics(&self) -> &AnalyticsStore {
        &self.analytics
    }

    pub fn budget(&self) -> &BudgetTracker {
        &self.budget
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn cache(&self) -> &SemanticCache<B> {
        &self.cache
    }

    /// Run the full query lifecycle: classify, check cache, admit against
    /// budget, route, execute, then record cost and cache the response.
    ///
    /// Records one [`AnalyticsEvent`] per call regardless of outcome, apart
    /// from the `InvalidInput` rejection above: that one never reaches a
    /// query id worth attaching an event to. This is independent of
    /// whatever `RoutingArtifact`s the run below also records.
    pub async fn process_query(&self, request: QueryRequest) -> Result<QueryResult, OrchestratorError> {
        if request.content.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput);
        }

        let start = Instant::now();
        let query_id = new_id();
        let result = self.process_query_inner(query_id, request, start).await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(r) => {
                let event_type = if r.cache_hit { AnalyticsEventType::CacheHit } else { AnalyticsEventType::QuerySucceeded };
                self.analytics
                    .record(query_id, event_type, Some(r.provider.clone()), Some(r.model.clone()), r.cost, elapsed_ms, r.cache_hit);
            }
            Err(OrchestratorError::BudgetExceeded { .. }) => {
                self.analytics.record(query_id, AnalyticsEventType::BudgetReject, None, None, 0.0, elapsed_ms, false);
            }
            Err(_) => {
                self.analytics.record(query_id, AnalyticsEventType::QueryFailed, None, None, 0.0, elapsed_ms, false);
            }
        }

        result
    }

    async fn process_query_inner(&self, query_id: QueryId, request: QueryRequest, start: Instant) -> Result<QueryResult, OrchestratorError> {
        let classification = classify_query(&request.content, &self.classifier_config);

        let cache_hit = if should_skip_cache(&classification) {
            None
        } else {
            self.cache.lookup(&classification.text).await
        };

        if let Some(hit) = cache_hit {
            self.artifacts.record_cache_hit(query_id, hit.entry.hash.clone(), hit.similarity);
            self.events.publish(
                Channel::Cache,
                "cache_hit",
                serde_json::json!({ "queryId": query_id.to_string(), "similarity": hit.similarity }),
            );
            return Ok(QueryResult {
                query_id,
                content: hit.entry.response,
                provider: "cache".to_owned(),
                model: "cache".to_owned(),
                classification,
                routing: None,
                cost: 0.0,
                cache_hit: true,
                similarity: Some(hit.similarity),
                escalated: false,
                total_time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                tokens: None,
                citations: Vec::new(),
            });
        }

        let daily = self.budget.get_status(Period::Daily);
        if daily.percent_used >= 100.0 {
            self.artifacts.record_budget_reject(
                query_id,
                serde_json::json!({ "spent": daily.spent, "limit": daily.limit, "percentUsed": daily.percent_used }),
            );
            return Err(OrchestratorError::BudgetExceeded {
                spent: daily.spent,
                limit: daily.limit,
            });
        }

        let emergency_mode = self.budget.is_emergency_mode_active();
        let mut decision = route(
            &self.costbook,
            &classification,
            request.strategy_override,
            emergency_mode,
            daily.remaining,
        )?;

        if self.budget.is_provider_disabled(&decision.provider) {
            decision = reroute_for_disabled_provider(&self.costbook, &classification, daily.remaining)?;
        }

        let route_artifact = self.artifacts.record_route_decision(
            query_id,
            classification.complexity,
            format!("{}/{}", decision.provider, decision.model),
            decision.estimated_cost,
            decision.reason.clone(),
        );

        let (response, quality, escalated) = match &decision.cascade_chain {
            Some(chain) => self.execute_cascade(query_id, chain, &classification).await?,
            None => {
                let response = self.call_direct(&decision, &classification, &request).await?;
                let quality = self.assess_response(&response, &classification, decision.strategy);
                (response, quality, false)
            }
        };

        let actual_cost = self
            .costbook
            .estimate_cost(&response.provider, &response.model, response.tokens.input, response.tokens.output)
            .estimated_cost;

        let skip_cache = should_skip_cache(&classification);
        let ttl = (!skip_cache).then(|| suggest_cache_ttl(&classification));
        let (_, ()) = tokio::join!(
            async {
                if !skip_cache {
                    self.cache.store(&classification.text, &response.content, ttl).await;
                }
            },
            async {
                self.budget.record_cost(ActualCost {
                    provider: response.provider.clone(),
                    model: response.model.clone(),
                    input_tokens: response.tokens.input,
                    output_tokens: response.tokens.output,
                    total_cost: actual_cost,
                    timestamp: now(),
                });
            },
        );

        self.artifacts.enrich_with_response(
            route_artifact.id,
            actual_cost,
            serde_json::json!({ "tokens": response.tokens.total, "finishReason": response.finish_reason }),
            quality_json(&quality),
            Some(quality.overall_score / 10.0),
        );

        Ok(QueryResult {
            query_id,
            content: response.content,
            provider: response.provider,
            model: response.model,
            classification,
            routing: Some(decision),
            cost: actual_cost,
            cache_hit: false,
            similarity: None,
            escalated,
            total_time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            tokens: Some(response.tokens),
            citations: response.citations,
        })
    }

    async fn call_direct(
        &self,
        decision: &RoutingDecision,
        query: &ClassifiedQuery,
        original: &QueryRequest,
    ) -> Result<ChatResponse, OrchestratorError> {
        let provider = self
            .providers
            .get(&decision.provider)
            .ok_or_else(|| OrchestratorError::UnknownProvider { provider: decision.provider.clone() })?;

        let request = ChatRequest {
            id: new_id().to_string(),
            content: query.text.clone(),
            system_prompt: original.system_prompt.clone(),
            conversation_history: original.conversation_history.clone(),
            max_tokens: original.max_tokens,
            temperature: original.temperature,
        };
        let response = cascadeflow_provider::retry::call_with_deadline(&decision.provider, &decision.model, decision.reasoning, || {
            provider.chat(&request, &decision.model)
        })
        .await?;
        Ok(response)
    }

    async fn execute_cascade(
        &self,
        query_id: QueryId,
        chain: &[cascadeflow_routing::CascadeStep],
        query: &ClassifiedQuery,
    ) -> Result<(ChatResponse, QualityReport, bool), OrchestratorError> {
        let outcome = run_cascade(
            chain,
            query,
            |name| self.providers.get(name).map(|p| p.as_ref()),
            |provider, model, score, index| {
                self.events.publish(
                    Channel::Event,
                    "cascade_step",
                    serde_json::json!({
                        "queryId": query_id.to_string(),
                        "provider": provider,
                        "model": model,
                        "score": score,
                        "index": index,
                    }),
                );
            },
        )
        .await?;

        let trail_entry = |step_index: usize, provider: &str, model: &str, score: f64| CascadeTrailEntry {
            provider: provider.to_owned(),
            model: model.to_owned(),
            score,
            index: step_index,
        };

        let winner_entry = trail_entry(
            outcome.winner.step_index,
            &outcome.winner.response.provider,
            &outcome.winner.response.model,
            outcome.winner.quality.overall_score,
        );

        // every attempt that didn't clear its own threshold escalated to the
        // next attempt in sequence, or to the winner if it was the last one tried
        let mut ordered: Vec<&cascadeflow_routing::CascadeAttempt> = outcome.attempts.iter().collect();
        ordered.push(&outcome.winner);
        for pair in ordered.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let from_entry = trail_entry(from.step_index, &from.response.provider, &from.response.model, from.quality.overall_score);
            let to_entry = trail_entry(to.step_index, &to.response.provider, &to.response.model, to.quality.overall_score);
            self.artifacts.record_cascade_escalation(query_id, from_entry, to_entry);
        }

        let trail: Vec<CascadeTrailEntry> = ordered
            .iter()
            .map(|a| trail_entry(a.step_index, &a.response.provider, &a.response.model, a.quality.overall_score))
            .collect();
        self.artifacts.record_cascade_success(query_id, winner_entry, trail);

        Ok((outcome.winner.response, outcome.winner.quality, outcome.escalated))
    }

    fn assess_response(&self, response: &ChatResponse, query: &ClassifiedQuery, _strategy: StrategyKind) -> QualityReport {
        let citations: Vec<Citation> = response.citations.iter().map(|c| Citation { hostname: c.hostname.clone() }).collect();
        let provider_supports_search = self.providers.get(&response.provider).is_some_and(|p| p.supports_web_search());
        let meta = ResponseMeta {
            text: &response.content,
            provider: &response.provider,
            is_search_provider: provider_supports_search,
            citations: &citations,
            latency_ms: Some(response.response_time_ms),
            input_tokens: Some(response.tokens.input),
            output_tokens: Some(response.tokens.output),
        };
        assess(&meta, query)
    }
}

fn quality_json(report: &QualityReport) -> Option<serde_json::Value> {
    Some(serde_json::json!({
        "overallScore": report.overall_score,
        "confidence": report.confidence,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascadeflow_budget::BudgetConfig;
    use cascadeflow_cache::MemoryCacheBackend;
    use cascadeflow_costbook::{Capability, ComplexityKey, ModelCostProfile};
    use cascadeflow_provider::mock::MockProvider;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn costbook() -> CostBook {
        CostBook::new(vec![
            ModelCostProfile {
                provider: "perplexity".to_owned(),
                model: "sonar".to_owned(),
                input_cost_per_1k: 0.001,
                output_cost_per_1k: 0.001,
                per_request_cost: 0.0,
                context_window: 128_000,
                max_output_tokens: 4096,
                suitable_for: [ComplexityKey::Simple, ComplexityKey::Medium, ComplexityKey::Complex].into_iter().collect(),
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
                suitable_for: [ComplexityKey::Simple, ComplexityKey::Medium, ComplexityKey::Complex].into_iter().collect(),
                capabilities: BTreeSet::new(),
                quality: 0.8,
            },
        ])
    }

    fn orchestrator() -> Orchestrator<MemoryCacheBackend> {
        let cache = SemanticCache::new(MemoryCacheBackend::new(100), 0.85, 100, Duration::from_secs(3600));
        let events = Arc::new(EventHub::new());
        let budget = BudgetTracker::new(
            BudgetConfig {
                daily_limit: 100.0,
                ..Default::default()
            },
            events.clone(),
        );
        let mut providers = ProviderRegistry::new();
        providers.insert(Arc::new(MockProvider::new("perplexity", true).with_fixed_response(
            "# Current price\n\nHere is a detailed, well-structured, confident answer with citations and steps.",
        )));
        providers.insert(Arc::new(MockProvider::new("openai", false).with_fixed_response(
            "A thorough and confident explanation with clear structure and steps.",
        )));
        Orchestrator::new(ClassifierConfig::default(), cache, budget, costbook(), events, providers)
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let orch = orchestrator();
        let err = orch
            .process_query(QueryRequest { content: "   ".to_owned(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput));
    }

    #[tokio::test]
    async fn second_near_duplicate_query_hits_cache() {
        let orch = orchestrator();
        let first = orch
            .process_query(QueryRequest { content: "Explain how hash maps resolve collisions".to_owned(), ..Default::default() })
            .await
            .expect("first call succeeds");
        assert!(!first.cache_hit);

        let second = orch
            .process_query(QueryRequest { content: "explain how hash maps resolve collisions.".to_owned(), ..Default::default() })
            .await
            .expect("second call succeeds");
        assert!(second.cache_hit);
        assert_eq!(second.cost, 0.0);
    }

    #[tokio::test]
    async fn budget_exhaustion_rejects_with_429_class_error() {
        let orch = orchestrator();
        orch.budget.record_cost(ActualCost {
            provider: "openai".to_owned(),
            model: "gpt-4o-mini".to_owned(),
            input_tokens: 1,
            output_tokens: 1,
            total_cost: 100.0,
            timestamp: now(),
        });

        let err = orch
            .process_query(QueryRequest { content: "any question here".to_owned(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::BudgetExceeded { .. }));

        let events = orch.analytics.get_recent(1);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].event_type, AnalyticsEventType::BudgetReject));
    }

    #[tokio::test]
    async fn successful_query_records_an_analytics_event_distinct_from_its_artifact() {
        let orch = orchestrator();
        orch.process_query(QueryRequest { content: "Explain how hash maps resolve collisions".to_owned(), ..Default::default() })
            .await
            .expect("call succeeds");

        let events = orch.analytics.get_recent(10);
        assert_eq!(events.len(), 1, "one analytics event per process_query run");
        assert!(matches!(events[0].event_type, AnalyticsEventType::QuerySucceeded));

        let artifacts = orch.artifacts.get_recent(10);
        assert!(!artifacts.is_empty(), "a RoutingArtifact is recorded independently of the analytics event");
    }

    #[tokio::test]
    async fn realtime_query_routes_to_web_search_provider() {
        let orch = orchestrator();
        let result = orch
            .process_query(QueryRequest {
                content: "What is the current Bitcoin price right now?".to_owned(),
                strategy_override: Some(StrategyOverride::Priority),
                ..Default::default()
            })
            .await
            .expect("should route");
        assert_eq!(result.provider, "perplexity");
    }
}
