//! Wire-format response types
//!
//! Mirrors the gateway's `synapse-llm::protocol` split between internal
//! domain types and the serializable shape a handler actually returns:
//! one `From`/explicit-builder conversion per response, so domain structs
//! never need to carry `serde` derives themselves.

use cascadeflow_artifacts::{AnalyticsEvent, AnalyticsEventType, AnalyticsSummary, ArtifactSummary, CascadeTrailEntry, RoutingArtifact};
use cascadeflow_budget::BudgetStatus;
use cascadeflow_classifier::{ClassifiedQuery, Complexity, Intent};
use cascadeflow_orchestrator::QueryResult;
use cascadeflow_provider::{ProviderCitation, TokenUsage};
use cascadeflow_routing::RoutingDecision;
use serde::Serialize;

fn complexity_str(c: Complexity) -> &'static str {
    match c {
        Complexity::Simple => "simple",
        Complexity::Medium => "medium",
        Complexity::Complex => "complex",
    }
}

fn intent_str(i: Intent) -> &'static str {
    match i {
        Intent::Search => "search",
        Intent::Reasoning => "reasoning",
        Intent::Chat => "chat",
        Intent::Creative => "creative",
        Intent::Code => "code",
    }
}

#[derive(Debug, Serialize)]
pub struct ClassificationDto {
    pub complexity: &'static str,
    #[serde(rename = "complexityScore")]
    pub complexity_score: f64,
    pub intent: &'static str,
    #[serde(rename = "isRealtime")]
    pub is_realtime: bool,
    #[serde(rename = "estimatedTokens")]
    pub estimated_tokens: u32,
}

impl From<&ClassifiedQuery> for ClassificationDto {
    fn from(q: &ClassifiedQuery) -> Self {
        Self {
            complexity: complexity_str(q.complexity),
            complexity_score: q.complexity_score,
            intent: intent_str(q.intent),
            is_realtime: q.is_realtime,
            estimated_tokens: q.estimated_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoutingDto {
    pub provider: String,
    pub model: String,
    pub strategy: &'static str,
    pub reason: String,
    #[serde(rename = "estimatedCost")]
    pub estimated_cost: f64,
    #[serde(rename = "emergencyMode")]
    pub emergency_mode: bool,
}

impl From<&RoutingDecision> for RoutingDto {
    fn from(d: &RoutingDecision) -> Self {
        Self {
            provider: d.provider.clone(),
            model: d.model.clone(),
            strategy: d.strategy.as_str(),
            reason: d.reason.clone(),
            estimated_cost: d.estimated_cost,
            emergency_mode: d.emergency_mode,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokensDto {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

impl From<TokenUsage> for TokensDto {
    fn from(t: TokenUsage) -> Self {
        Self { input: t.input, output: t.output, total: t.total }
    }
}

#[derive(Debug, Serialize)]
pub struct CitationDto {
    pub url: String,
    pub hostname: String,
}

impl From<&ProviderCitation> for CitationDto {
    fn from(c: &ProviderCitation) -> Self {
        Self { url: c.url.clone(), hostname: c.hostname.clone() }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponseDto {
    pub id: String,
    pub content: String,
    pub provider: String,
    pub model: String,
    #[serde(rename = "cacheHit")]
    pub cache_hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokensDto>,
    #[serde(rename = "responseTimeMs")]
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<CitationDto>,
    pub classification: ClassificationDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingDto>,
    pub escalated: bool,
}

impl From<&QueryResult> for QueryResponseDto {
    fn from(r: &QueryResult) -> Self {
        Self {
            id: r.query_id.to_string(),
            content: r.content.clone(),
            provider: r.provider.clone(),
            model: r.model.clone(),
            cache_hit: r.cache_hit,
            similarity: r.similarity,
            cost: r.cost,
            tokens: r.tokens.map(TokensDto::from),
            response_time_ms: r.total_time_ms,
            citations: r.citations.iter().map(CitationDto::from).collect(),
            classification: ClassificationDto::from(&r.classification),
            routing: r.routing.as_ref().map(RoutingDto::from),
            escalated: r.escalated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BudgetStatusDto {
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    #[serde(rename = "percentUsed")]
    pub percent_used: f64,
}

impl From<BudgetStatus> for BudgetStatusDto {
    fn from(s: BudgetStatus) -> Self {
        Self { limit: s.limit, spent: s.spent, remaining: s.remaining, percent_used: s.percent_used }
    }
}

#[derive(Debug, Serialize)]
pub struct CascadeTrailEntryDto {
    pub provider: String,
    pub model: String,
    pub score: f64,
    pub index: usize,
}

impl From<&CascadeTrailEntry> for CascadeTrailEntryDto {
    fn from(e: &CascadeTrailEntry) -> Self {
        Self { provider: e.provider.clone(), model: e.model.clone(), score: e.score, index: e.index }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtifactDto {
    pub id: String,
    #[serde(rename = "queryId")]
    pub query_id: String,
    #[serde(rename = "epochMs")]
    pub epoch_ms: i64,
    #[serde(rename = "type")]
    pub artifact_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<&'static str>,
    #[serde(rename = "selectedModel", skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,
    #[serde(rename = "estimatedCost")]
    pub estimated_cost: f64,
    #[serde(rename = "actualCost", skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(rename = "cascadeTrail", skip_serializing_if = "Vec::is_empty")]
    pub cascade_trail: Vec<CascadeTrailEntryDto>,
    pub tags: Vec<String>,
}

impl From<&RoutingArtifact> for ArtifactDto {
    fn from(a: &RoutingArtifact) -> Self {
        Self {
            id: a.id.to_string(),
            query_id: a.query_id.to_string(),
            epoch_ms: a.epoch_ms,
            artifact_type: a.artifact_type.as_str(),
            complexity: a.complexity.map(complexity_str),
            selected_model: a.selected_model.clone(),
            estimated_cost: a.estimated_cost,
            actual_cost: a.actual_cost,
            confidence: a.confidence,
            reasoning: a.reasoning.clone(),
            cascade_trail: a.cascade_trail.iter().map(CascadeTrailEntryDto::from).collect(),
            tags: a.tags.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtifactSummaryDto {
    #[serde(rename = "todayCount")]
    pub today_count: usize,
    #[serde(rename = "totalCostToday")]
    pub total_cost_today: f64,
    #[serde(rename = "cascadeEscalationCount")]
    pub cascade_escalation_count: usize,
    #[serde(rename = "cacheHitCount")]
    pub cache_hit_count: usize,
    #[serde(rename = "averageConfidence")]
    pub average_confidence: f64,
}

impl From<ArtifactSummary> for ArtifactSummaryDto {
    fn from(s: ArtifactSummary) -> Self {
        Self {
            today_count: s.today_count,
            total_cost_today: s.total_cost_today,
            cascade_escalation_count: s.cascade_escalation_count,
            cache_hit_count: s.cache_hit_count,
            average_confidence: s.average_confidence,
        }
    }
}

fn analytics_event_type_str(t: AnalyticsEventType) -> &'static str {
    t.as_str()
}

#[derive(Debug, Serialize)]
pub struct AnalyticsEventDto {
    pub id: String,
    #[serde(rename = "queryId")]
    pub query_id: String,
    #[serde(rename = "epochMs")]
    pub epoch_ms: i64,
    #[serde(rename = "type")]
    pub event_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub cost: f64,
    #[serde(rename = "latencyMs")]
    pub latency_ms: u64,
    #[serde(rename = "cacheHit")]
    pub cache_hit: bool,
}

impl From<&AnalyticsEvent> for AnalyticsEventDto {
    fn from(e: &AnalyticsEvent) -> Self {
        Self {
            id: e.id.to_string(),
            query_id: e.query_id.to_string(),
            epoch_ms: e.epoch_ms,
            event_type: analytics_event_type_str(e.event_type),
            provider: e.provider.clone(),
            model: e.model.clone(),
            cost: e.cost,
            latency_ms: e.latency_ms,
            cache_hit: e.cache_hit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummaryDto {
    #[serde(rename = "totalEvents")]
    pub total_events: usize,
    #[serde(rename = "successCount")]
    pub success_count: usize,
    #[serde(rename = "failureCount")]
    pub failure_count: usize,
    #[serde(rename = "cacheHitCount")]
    pub cache_hit_count: usize,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    #[serde(rename = "averageLatencyMs")]
    pub average_latency_ms: f64,
}

impl From<AnalyticsSummary> for AnalyticsSummaryDto {
    fn from(s: AnalyticsSummary) -> Self {
        Self {
            total_events: s.total_events,
            success_count: s.success_count,
            failure_count: s.failure_count,
            cache_hit_count: s.cache_hit_count,
            total_cost: s.total_cost,
            average_latency_ms: s.average_latency_ms,
        }
    }
}
