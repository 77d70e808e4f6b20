// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize logging only. Used by the CLI, which has no metrics endpoint.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    // 1. Initialize Tracing (Logs)
    init_logging("penguin_node=debug,tower_http=debug");

    // 2. Initialize Metrics (Prometheus)
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => tracing::error!("Failed to install Prometheus recorder: {}", e),
    }

    metrics::describe_counter!("penguin_relay_requests_total", "Requests relayed to the coprocessor");
    metrics::describe_counter!("penguin_relay_errors_total", "Relayed requests that failed");
    metrics::describe_histogram!("penguin_relay_duration_seconds", "Time spent waiting on the coprocessor");
    metrics::describe_counter!("penguin_blocks_stored_total", "Blocks inserted into session stores");
    metrics::describe_histogram!("penguin_compute_duration_seconds", "Time taken by a full compute run");

    // Ensure at least one metric exists on startup
    metrics::gauge!("penguin_proxy_up", 1.0);
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
