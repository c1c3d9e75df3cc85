use axum::Json;
use axum::extract::{Path, Query, State};
use cascadeflow_artifacts::ArtifactType;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::dto::{ArtifactDto, ArtifactSummaryDto};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ArtifactsQuery {
    limit: Option<usize>,
    #[serde(rename = "type")]
    artifact_type: Option<String>,
    tag: Option<String>,
}

fn parse_type(raw: &str) -> Option<ArtifactType> {
    match raw {
        "cache_hit" => Some(ArtifactType::CacheHit),
        "budget_reject" => Some(ArtifactType::BudgetReject),
        "route_decision" => Some(ArtifactType::RouteDecision),
        "cascade_escalation" => Some(ArtifactType::CascadeEscalation),
        "cascade_success" => Some(ArtifactType::CascadeSuccess),
        _ => None,
    }
}

pub async fn artifacts_handler(State(state): State<AppState>, Query(query): Query<ArtifactsQuery>) -> Json<Value> {
    let store = state.orchestrator.artifacts();

    let artifacts = if let Some(tag) = &query.tag {
        store.get_by_tag(tag, query.limit)
    } else if let Some(artifact_type) = query.artifact_type.as_deref().and_then(parse_type) {
        store.get_by_type(artifact_type, query.limit)
    } else {
        store.get_recent(query.limit.unwrap_or(100))
    };

    let artifacts: Vec<ArtifactDto> = artifacts.iter().map(ArtifactDto::from).collect();
    let summary = ArtifactSummaryDto::from(store.get_summary());

    Json(json!({ "artifacts": artifacts, "summary": summary }))
}

pub async fn artifacts_by_query_handler(State(state): State<AppState>, Path(query_id): Path<Uuid>) -> Json<Value> {
    let artifacts: Vec<ArtifactDto> = state
        .orchestrator
        .artifacts()
        .get_by_query_id(query_id)
        .iter()
        .map(ArtifactDto::from)
        .collect();

    Json(json!({ "artifacts": artifacts }))
}
