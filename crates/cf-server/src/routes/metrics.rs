use std::fmt::Write as _;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use cascadeflow_budget::Period;
use cascadeflow_cache::CacheBackend;
use http::header;

use crate::state::AppState;

/// Render in-process counters as Prometheus text exposition format
///
/// No `prometheus`/`metrics` crate in the dependency stack yet — this is a
/// fixed handful of gauges derived straight from existing state, not a
/// general-purpose registry.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let counts = state.orchestrator.artifacts().counts_by_type();
    let daily = state.orchestrator.budget().get_status(Period::Daily);
    let cache_size = state.orchestrator.cache().backend().size().await.unwrap_or(0);
    let ws_clients = state.events.subscriber_count(cascadeflow_events::Channel::Event);

    let mut body = String::new();
    let _ = writeln!(body, "# HELP cascadeflow_budget_spent_daily_usd Daily spend in USD.");
    let _ = writeln!(body, "# TYPE cascadeflow_budget_spent_daily_usd gauge");
    let _ = writeln!(body, "cascadeflow_budget_spent_daily_usd {}", daily.spent);

    let _ = writeln!(body, "# HELP cascadeflow_budget_percent_used_daily Percent of the daily budget used.");
    let _ = writeln!(body, "# TYPE cascadeflow_budget_percent_used_daily gauge");
    let _ = writeln!(body, "cascadeflow_budget_percent_used_daily {}", daily.percent_used);

    let _ = writeln!(body, "# HELP cascadeflow_cache_entries Current cache entry count.");
    let _ = writeln!(body, "# TYPE cascadeflow_cache_entries gauge");
    let _ = writeln!(body, "cascadeflow_cache_entries {cache_size}");

    let _ = writeln!(body, "# HELP cascadeflow_ws_clients Connected WebSocket clients.");
    let _ = writeln!(body, "# TYPE cascadeflow_ws_clients gauge");
    let _ = writeln!(body, "cascadeflow_ws_clients {ws_clients}");

    let _ = writeln!(body, "# HELP cascadeflow_artifacts_total Recorded artifacts by type.");
    let _ = writeln!(body, "# TYPE cascadeflow_artifacts_total counter");
    for (kind, count) in counts {
        let _ = writeln!(body, "cascadeflow_artifacts_total{{type=\"{kind}\"}} {count}");
    }

    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response()
}
