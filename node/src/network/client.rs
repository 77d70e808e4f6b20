// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use async_trait::async_trait;
use penguin_mint::input::TaskRequest;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde_json::{json, Value};

use crate::api::IssueTaskRequest;
use crate::config::InputEncoding;
use crate::errors::RelayError;

/// The two calls the pipeline makes against the coprocessor.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn issue_task(&self, task: &TaskRequest) -> Result<Value, RelayError>;

    /// `digest_hex` is lowercase hex without `0x`.
    async fn fetch_preimage(&self, hash_type: u8, digest_hex: &str) -> Result<Vec<u8>, RelayError>;
}

/// Maps non-success statuses to `RelayError::Upstream` with the body kept verbatim.
async fn check_status(resp: Response) -> Result<Response, RelayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!("Upstream returned {}: {}", status, body);
    Err(RelayError::Upstream {
        status: status.as_u16(),
        body,
    })
}

async fn read_json(resp: Response) -> Result<Value, RelayError> {
    let bytes = check_status(resp).await?.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| RelayError::MalformedBody(e.to_string()))
}

async fn read_bytes(resp: Response) -> Result<Vec<u8>, RelayError> {
    let bytes = check_status(resp).await?.bytes().await?;
    Ok(bytes.to_vec())
}

/// Talks to the remote coprocessor solver.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
    encoding: InputEncoding,
    client: Client,
}

impl UpstreamClient {
    pub fn new(url: impl Into<String>, encoding: InputEncoding) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            encoding,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Relay for UpstreamClient {
    async fn issue_task(&self, task: &TaskRequest) -> Result<Value, RelayError> {
        let url = format!(
            "{}/issue_task/{}/{}",
            self.base_url,
            task.machine_hash_hex(),
            task.target_address_hex()
        );
        tracing::debug!("Issuing task to {}", url);

        let req = self.client.post(&url);
        let req = match self.encoding {
            InputEncoding::Json => req.json(&json!({ "input": task.input_hex() })),
            InputEncoding::Binary => req
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(task.input.clone()),
        };
        read_json(req.send().await?).await
    }

    async fn fetch_preimage(&self, hash_type: u8, digest_hex: &str) -> Result<Vec<u8>, RelayError> {
        let url = format!("{}/get_preimage/{}/{}", self.base_url, hash_type, digest_hex);
        tracing::debug!("Fetching preimage from {}", url);
        read_bytes(self.client.get(&url).send().await?).await
    }
}

/// Talks to a running proxy relay.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    client: Client,
}

impl ProxyClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn preimage_url(&self, hash_type: u8, digest_hex: &str) -> String {
        format!("{}/get_preimage/{}/{}", self.base_url, hash_type, digest_hex)
    }
}

#[async_trait]
impl Relay for ProxyClient {
    async fn issue_task(&self, task: &TaskRequest) -> Result<Value, RelayError> {
        let url = format!("{}/issue_task", self.base_url);
        let body = IssueTaskRequest::from_task(task);
        read_json(self.client.post(&url).json(&body).send().await?).await
    }

    async fn fetch_preimage(&self, hash_type: u8, digest_hex: &str) -> Result<Vec<u8>, RelayError> {
        let url = self.preimage_url(hash_type, digest_hex);
        read_bytes(self.client.get(&url).send().await?).await
    }
}
