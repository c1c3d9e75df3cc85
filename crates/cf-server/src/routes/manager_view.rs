use axum::Json;
use axum::extract::State;
use cascadeflow_budget::Period;
use cascadeflow_cache::CacheBackend;
use serde_json::{Value, json};

use crate::dto::{ArtifactSummaryDto, BudgetStatusDto};
use crate::state::AppState;

/// Aggregated snapshot across budget, cache, and artifact state, for a
/// dashboard that wants one round trip instead of four.
pub async fn manager_view_handler(State(state): State<AppState>) -> Json<Value> {
    let budget = state.orchestrator.budget();
    let cache_size = state.orchestrator.cache().backend().size().await.unwrap_or(0);
    let summary = ArtifactSummaryDto::from(state.orchestrator.artifacts().get_summary());
    let counts = state.orchestrator.artifacts().counts_by_type();

    Json(json!({
        "budget": {
            "daily": BudgetStatusDto::from(budget.get_status(Period::Daily)),
            "emergencyMode": budget.is_emergency_mode_active(),
        },
        "cache": { "size": cache_size },
        "artifacts": { "summary": summary, "countsByType": counts },
        "uptime": state.uptime_seconds(),
    }))
}
