// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Offline stand-in for the coprocessor solver.
//!
//! Every issued task is answered with the fixture NFT for the seed found in
//! its input, and the fixture's preimages become fetchable.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use penguin_mint::fixtures::{keccak, nft_fixture, NftFixture};
use penguin_mint::input::decode_mint_input;
use penguin_mint::notice::{encode_notice_call_with, notice_selector, service_response};
use penguin_mint::types::id::{decode_hex, decode_hex32};
use rustc_hash::FxHashMap;
use serde_json::{json, Value};

/// Hash type the coprocessor uses for keccak256 preimages.
pub const KECCAK_HASH_TYPE: u8 = 2;

#[derive(Debug, Clone)]
pub struct MockOptions {
    /// Selector placed in front of the notice call.
    pub selector: [u8; 4],
    /// Point the notice at the `[cid, keccak(block)]` listing.
    pub digest_listing: bool,
    /// Answer tasks without a notice.
    pub with_notice: bool,
    /// Fail every preimage fetch with 500 and this body.
    pub busy: Option<String>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            selector: notice_selector(),
            digest_listing: false,
            with_notice: true,
            busy: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockCoprocessor {
    options: MockOptions,
    preimages: Mutex<FxHashMap<[u8; 32], Vec<u8>>>,
    tasks: AtomicUsize,
}

pub type SharedMock = Arc<MockCoprocessor>;

impl MockCoprocessor {
    pub fn new(options: MockOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn tasks_issued(&self) -> usize {
        self.tasks.load(Ordering::SeqCst)
    }

    /// Makes `bytes` fetchable under its keccak256.
    pub fn register(&self, bytes: Vec<u8>) -> [u8; 32] {
        let digest = keccak(&bytes);
        if let Ok(mut preimages) = self.preimages.lock() {
            preimages.insert(digest, bytes);
        }
        digest
    }

    fn preimage(&self, digest: &[u8; 32]) -> Option<Vec<u8>> {
        self.preimages.lock().ok()?.get(digest).cloned()
    }

    /// Registers the fixture's preimages and builds the task response.
    pub fn answer(&self, fixture: &NftFixture) -> Value {
        for (_, bytes) in &fixture.preimages {
            self.register(bytes.clone());
        }
        if !self.options.with_notice {
            return json!({ "service_response": [ { "status": "ok" } ] });
        }

        let notice = if self.options.digest_listing {
            fixture.digest_notice()
        } else {
            fixture.notice.clone()
        };
        let call = encode_notice_call_with(self.options.selector, &notice);
        service_response(&format!("0x{}", hex::encode(keccak(&call))), &call)
    }
}

pub fn build_router(mock: SharedMock) -> Router {
    Router::new()
        .route("/issue_task/:machine_hash/:address", post(issue_task))
        .route("/get_preimage/:hash_type/:digest", get(get_preimage))
        .with_state(mock)
}

fn bad_request(msg: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, msg.into()).into_response()
}

async fn issue_task(
    State(mock): State<SharedMock>,
    Path((machine_hash, address)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if decode_hex32(&machine_hash).is_err() {
        return bad_request(format!("invalid machine hash {machine_hash}"));
    }
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    let input = if is_json {
        let parsed: Value = match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => return bad_request(e.to_string()),
        };
        match parsed.get("input").and_then(Value::as_str).map(decode_hex) {
            Some(Ok(bytes)) => bytes,
            _ => return bad_request("missing or invalid `input`"),
        }
    } else {
        body.to_vec()
    };

    let (wallet, seed) = match decode_mint_input(&input) {
        Ok(decoded) => decoded,
        Err(e) => return bad_request(e.to_string()),
    };
    let fixture = match nft_fixture(seed) {
        Ok(f) => f,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };
    mock.tasks.fetch_add(1, Ordering::SeqCst);
    tracing::info!("Task for {:?} seed {} on behalf of {}", wallet, seed, address);

    Json(mock.answer(&fixture)).into_response()
}

async fn get_preimage(
    State(mock): State<SharedMock>,
    Path((hash_type, digest)): Path<(u8, String)>,
) -> Response {
    if let Some(body) = &mock.options.busy {
        return (StatusCode::INTERNAL_SERVER_ERROR, body.clone()).into_response();
    }
    if hash_type != KECCAK_HASH_TYPE {
        return bad_request(format!("unsupported hash type {hash_type}"));
    }
    let Ok(digest) = decode_hex32(&digest) else {
        return bad_request(format!("invalid digest {digest}"));
    };

    match mock.preimage(&digest) {
        Some(bytes) => ([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response(),
        None => (StatusCode::NOT_FOUND, "preimage not found").into_response(),
    }
}

/// Serves the mock on `addr` in the background and returns the bound address.
pub async fn spawn(mock: SharedMock, addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, build_router(mock)).await {
            tracing::error!("Mock coprocessor stopped: {}", e);
        }
    });
    Ok(bound)
}

/// Spawns a mock on an ephemeral localhost port and returns its base URL.
pub async fn spawn_local(options: MockOptions) -> std::io::Result<(SharedMock, String)> {
    let mock = Arc::new(MockCoprocessor::new(options));
    let addr = spawn(mock.clone(), SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    Ok((mock, format!("http://{addr}")))
}
