//! Structured logging initialization
//!
//! The gateway's own `synapse-telemetry` wires `tracing-subscriber` up to
//! an OTLP exporter for metrics and traces; this system's non-goals
//! exclude an external metrics backend (its `/metrics` endpoint, built in
//! `cascadeflow-server`, serves Prometheus text format directly from
//! in-process counters instead), so this crate keeps only the `fmt` layer
//! the gateway falls back to when no exporter is configured.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global `tracing` subscriber
///
/// `log_filter` follows `tracing_subscriber::EnvFilter` syntax (e.g. `"info"`,
/// `"cascadeflow_routing=debug,info"`); an unparseable filter falls back to `"info"`.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init(log_filter: &str) {
    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
