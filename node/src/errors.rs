// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use penguin_mint::{DecodeError, StoreError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Non-success status from the coprocessor. Displays the body verbatim.
    #[error("{body}")]
    Upstream { status: u16, body: String },
    #[error("Upstream unreachable: {0}")]
    Transport(String),
    #[error("Malformed upstream response: {0}")]
    MalformedBody(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RelayError::Upstream { status, body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                return (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
                    .into_response();
            }
            RelayError::Transport(msg) => (StatusCode::BAD_GATEWAY, msg),
            RelayError::MalformedBody(msg) => (StatusCode::BAD_GATEWAY, msg),
            RelayError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<DecodeError> for RelayError {
    fn from(e: DecodeError) -> Self {
        RelayError::InvalidInput(e.to_string())
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Transport(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("No private key configured")]
    NotConfigured,
    #[error("Wallet not connected")]
    NotConnected,
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Transaction rejected: {0}")]
    Rejected(String),
    #[error("Transaction {tx} reverted")]
    Reverted { tx: String },
    #[error("Transaction {tx} dropped before confirmation")]
    Dropped { tx: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("No seed entered")]
    MissingSeed,
    #[error("No NFT computed yet")]
    NoNft,
}
