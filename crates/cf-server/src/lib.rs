//! HTTP and WebSocket transport: wires the routing core into an axum [`Router`]
//!
//! Follows the gateway's `synapse-server::Server` shape — one struct holding
//! an assembled [`Router`] and the resolved listen address, a `new` that
//! does all the wiring, and a `serve` that binds and runs with graceful
//! shutdown — generalized from the gateway's many feature-gated subsystem
//! routers down to the one routing-core state this system has.

#![allow(clippy::must_use_candidate)]

mod cors;
mod dto;
mod error;
mod rate_limit;
mod routes;
mod state;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use cascadeflow_cache::{MemoryCacheBackend, SemanticCache};
use cascadeflow_budget::{AlertAction, AlertThreshold, BudgetConfig as TrackerBudgetConfig, BudgetTracker};
use cascadeflow_classifier::ClassifierConfig;
use cascadeflow_config::Config;
use cascadeflow_costbook::{CostBook, default_catalog};
use cascadeflow_events::EventHub;
use cascadeflow_orchestrator::{Orchestrator, ProviderRegistry};
use cascadeflow_provider::stub::StubProvider;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build a [`ProviderRegistry`] from configured providers, filtering the
/// built-in pricing catalog down to each provider's enabled model list
fn build_providers(config: &Config) -> ProviderRegistry {
    let catalog = default_catalog();
    let mut registry = ProviderRegistry::new();

    for (name, provider_config) in &config.providers {
        if provider_config.api_key.is_none() {
            tracing::info!(provider = %name, "no api key configured, adapter disabled");
            continue;
        }

        let profiles: Vec<_> = catalog.iter().filter(|p| &p.provider == name && provider_config.models.contains(&p.model)).collect();
        if profiles.is_empty() {
            tracing::warn!(provider = %name, "no catalog entries match the configured model list");
            continue;
        }

        let supports_web_search = profiles.iter().any(|p| p.capabilities.contains(&cascadeflow_costbook::Capability::WebSearch));
        let models: Vec<String> = profiles.iter().map(|p| p.model.clone()).collect();
        let avg_input = profiles.iter().map(|p| p.input_cost_per_1k).sum::<f64>() / profiles.len() as f64;
        let avg_output = profiles.iter().map(|p| p.output_cost_per_1k).sum::<f64>() / profiles.len() as f64;

        registry.insert(Arc::new(StubProvider::new(name.clone(), supports_web_search, models, avg_input, avg_output)));
    }

    registry
}

fn build_costbook(config: &Config) -> CostBook {
    let enabled: Vec<_> = default_catalog()
        .into_iter()
        .filter(|p| {
            config
                .providers
                .get(&p.provider)
                .is_some_and(|pc| pc.api_key.is_some() && pc.models.contains(&p.model))
        })
        .collect();
    CostBook::new(enabled)
}

fn build_budget(config: &Config, events: Arc<EventHub>) -> BudgetTracker {
    let thresholds = vec![AlertThreshold {
        key: "emergency".to_owned(),
        percentage: config.budget.emergency_threshold,
        action: AlertAction::EmergencyMode,
    }];

    BudgetTracker::new(
        TrackerBudgetConfig {
            daily_limit: config.budget.daily.as_ref().map_or(0.0, |l| l.limit),
            weekly_limit: config.budget.weekly.as_ref().map_or(0.0, |l| l.limit),
            monthly_limit: config.budget.monthly.as_ref().map_or(0.0, |l| l.limit),
            thresholds,
            ..Default::default()
        },
        events,
    )
}

fn build_classifier_config(config: &Config) -> ClassifierConfig {
    ClassifierConfig {
        simple_threshold: config.routing.complexity_thresholds.medium,
        medium_threshold: config.routing.complexity_thresholds.complex,
    }
}

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured host/port cannot be parsed into a
    /// socket address
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

        let events = Arc::new(EventHub::new());
        let cache = SemanticCache::new(
            MemoryCacheBackend::new(config.cache.max_entries),
            config.cache.similarity_threshold,
            config.cache.max_entries,
            Duration::from_millis(config.cache.ttl_ms),
        );
        let budget = build_budget(&config, events.clone());
        let costbook = build_costbook(&config);
        let providers = build_providers(&config);
        let classifier_config = build_classifier_config(&config);

        let orchestrator = Arc::new(Orchestrator::new(classifier_config, cache, budget, costbook, events.clone(), providers));
        let app_state = AppState::new(orchestrator, events, &config);

        let router = Router::new()
            .route("/api/query", post(routes::query::query_handler))
            .route("/api/health", get(routes::health::health_handler))
            .route("/api/analytics", get(routes::analytics::analytics_summary_handler))
            .route("/api/analytics/events", get(routes::analytics::analytics_events_handler))
            .route("/api/budget", get(routes::budget::budget_handler))
            .route("/api/cache", get(routes::cache::cache_stats_handler))
            .route("/api/cache/clear", post(routes::cache::cache_clear_handler))
            .route("/api/artifacts", get(routes::artifacts::artifacts_handler))
            .route("/api/artifacts/{query_id}", get(routes::artifacts::artifacts_by_query_handler))
            .route("/api/manager-view", get(routes::manager_view::manager_view_handler))
            .route("/metrics", get(routes::metrics::metrics_handler))
            .route("/ws", get(ws::ws_handler))
            .layer(TraceLayer::new_for_http())
            .layer(cors::cors_layer(&app_state.cors_origin))
            .with_state(app_state);

        Ok(Self { router, listen_address })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests. Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
