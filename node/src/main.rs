// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use penguin_node::config::NodeConfig;
use penguin_node::network::UpstreamClient;
use penguin_node::server::build_router;
use penguin_node::telemetry::init_telemetry;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    init_telemetry();

    let cfg = match NodeConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };
    tracing::info!("Initializing proxy relay with config: {:?}", cfg);

    let relay = UpstreamClient::new(cfg.upstream_url.clone(), cfg.input_encoding);
    let app = build_router(Arc::new(relay));

    let addr = cfg.bind_addr;
    tracing::info!("Proxy server listening on {}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
