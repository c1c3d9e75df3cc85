use axum::Json;
use axum::extract::State;
use cascadeflow_cache::CacheBackend;
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct CacheEntrySummary {
    hash: String,
    #[serde(rename = "queryText")]
    query_text: String,
    #[serde(rename = "hitCount")]
    hit_count: u64,
    #[serde(rename = "expiresAtMs")]
    expires_at_ms: i64,
}

pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<Value> {
    let backend = state.orchestrator.cache().backend();
    let entries = backend.entries().await.unwrap_or_default();
    let size = backend.size().await.unwrap_or(0);

    let mut shown: Vec<_> = entries
        .iter()
        .map(|e| CacheEntrySummary {
            hash: e.hash.clone(),
            query_text: e.query_text.clone(),
            hit_count: e.hit_count,
            expires_at_ms: cascadeflow_core::time::to_epoch_millis(e.expires_at),
        })
        .collect();
    shown.sort_by(|a, b| b.hit_count.cmp(&a.hit_count));
    shown.truncate(100);

    Json(json!({
        "stats": {
            "size": size,
            "maxEntries": state.orchestrator.cache().max_entries(),
        },
        "entries": shown,
    }))
}

pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<Value> {
    let _ = state.orchestrator.cache().backend().clear().await;
    Json(json!({ "message": "cache cleared" }))
}
