use std::sync::Arc;
use std::time::Instant;

use cascadeflow_cache::MemoryCacheBackend;
use cascadeflow_config::Config;
use cascadeflow_events::EventHub;
use cascadeflow_orchestrator::Orchestrator;

use crate::rate_limit::ConnectionLimiter;

/// Shared state handed to every axum handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator<MemoryCacheBackend>>,
    pub events: Arc<EventHub>,
    pub started_at: Instant,
    pub cors_origin: String,
    pub ws_limiter: Arc<ConnectionLimiter>,
}

impl AppState {
    #[must_use]
    pub fn new(orchestrator: Arc<Orchestrator<MemoryCacheBackend>>, events: Arc<EventHub>, config: &Config) -> Self {
        Self {
            orchestrator,
            events,
            started_at: Instant::now(),
            cors_origin: config.server.cors.origin.clone(),
            ws_limiter: Arc::new(ConnectionLimiter::new()),
        }
    }

    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
