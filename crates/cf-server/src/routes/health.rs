use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ProviderHealth {
    live: bool,
    healthy: bool,
    #[serde(rename = "latencyMs")]
    latency_ms: u64,
    #[serde(rename = "successRate")]
    success_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    providers: Map<String, Value>,
    #[serde(rename = "wsClients")]
    ws_clients: usize,
    uptime: u64,
    timestamp: i64,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.orchestrator.providers();
    let mut providers = Map::new();
    let mut any_unhealthy = false;

    for name in registry.names() {
        let Some(provider) = registry.get(name) else { continue };
        let started = Instant::now();
        let healthy = provider.health_check().await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        any_unhealthy |= !healthy;

        let entry = ProviderHealth { live: true, healthy, latency_ms, success_rate: if healthy { 1.0 } else { 0.0 } };
        providers.insert((*name).to_owned(), serde_json::to_value(entry).unwrap_or(Value::Null));
    }

    // Every connection subscribes to every channel on connect; the event
    // channel alone is therefore a faithful proxy for live client count.
    let ws_clients = state.events.subscriber_count(cascadeflow_events::Channel::Event);

    Json(HealthResponse {
        status: if any_unhealthy { "degraded" } else { "ok" },
        providers,
        ws_clients,
        uptime: state.uptime_seconds(),
        timestamp: cascadeflow_core::time::to_epoch_millis(cascadeflow_core::time::now()),
    })
}
