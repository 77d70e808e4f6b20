// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use penguin_mint::types::id::strip_0x;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{HealthResponse, IssueTaskRequest};
use crate::errors::RelayError;
use crate::network::Relay;

/// Relay the proxy forwards to. Stateless, shared across requests.
pub type SharedRelay = Arc<dyn Relay>;

pub fn build_router(relay: SharedRelay) -> Router {
    Router::new()
        .route("/issue_task", post(issue_task))
        .route("/get_preimage/:hash_type/:digest", get(get_preimage))
        .route("/health", get(health))
        // Observability
        .route("/metrics", get(metrics_handler))
        .with_state(relay)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn record(op: &'static str, started: Instant, ok: bool) {
    metrics::counter!("penguin_relay_requests_total", 1, "op" => op);
    if !ok {
        metrics::counter!("penguin_relay_errors_total", 1, "op" => op);
    }
    metrics::histogram!(
        "penguin_relay_duration_seconds",
        started.elapsed().as_secs_f64(),
        "op" => op
    );
}

async fn issue_task(
    State(relay): State<SharedRelay>,
    Json(req): Json<IssueTaskRequest>,
) -> Result<Json<Value>, RelayError> {
    let started = Instant::now();
    let task = req.to_task()?;
    tracing::info!(
        "issue_task machine={} address={} input_len={}",
        task.machine_hash_hex(),
        task.target_address_hex(),
        task.input.len()
    );

    let result = relay.issue_task(&task).await;
    record("issue_task", started, result.is_ok());
    Ok(Json(result?))
}

async fn get_preimage(
    State(relay): State<SharedRelay>,
    Path((hash_type, digest)): Path<(u8, String)>,
) -> Result<impl IntoResponse, RelayError> {
    let started = Instant::now();
    let digest = strip_0x(&digest).to_ascii_lowercase();
    if digest.is_empty() || hex::decode(&digest).is_err() {
        return Err(RelayError::InvalidInput(format!("digest `{digest}` is not hex")));
    }

    let result = relay.fetch_preimage(hash_type, &digest).await;
    record("get_preimage", started, result.is_ok());
    let bytes = result?;
    tracing::debug!("Relayed preimage {} ({} bytes)", digest, bytes.len());
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
