use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::dto::{AnalyticsEventDto, AnalyticsSummaryDto, ArtifactSummaryDto};
use crate::state::AppState;

pub async fn analytics_summary_handler(State(state): State<AppState>) -> Json<Value> {
    let artifact_summary = ArtifactSummaryDto::from(state.orchestrator.artifacts().get_summary());
    let counts = state.orchestrator.artifacts().counts_by_type();
    let analytics_summary = AnalyticsSummaryDto::from(state.orchestrator.analytics().get_summary());
    Json(json!({
        "summary": artifact_summary,
        "countsByType": counts,
        "analytics": analytics_summary,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

/// Analytics events: one per completed `process_query` run, independent of
/// the routing-decision artifacts `analytics_summary_handler` also reports.
pub async fn analytics_events_handler(State(state): State<AppState>, Query(query): Query<EventsQuery>) -> Json<Value> {
    let limit = query.limit.unwrap_or(100).min(1000);
    let offset = query.offset.unwrap_or(0);

    let all = state.orchestrator.analytics().get_recent(usize::MAX);
    let total = all.len();
    let page: Vec<_> = all.into_iter().skip(offset).take(limit).map(|e| AnalyticsEventDto::from(&e)).collect();

    Json(json!({
        "events": page,
        "total": total,
    }))
}
