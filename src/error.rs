// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

/// Failures while turning bytes from the coprocessor into typed values.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// A present notice response did not have the expected nested shape.
    #[error("Notice response field `{path}` is missing or malformed")]
    NoticeShape { path: String },
    /// The notice call data did not start with the `Notice(bytes)` selector.
    #[error("Notice selector mismatch: expected 0x{expected}, found 0x{found} (call data 0x{raw})")]
    SelectorMismatch {
        expected: String,
        found: String,
        raw: String,
    },
    /// ABI decoding failed. `raw` is the hex of the offending bytes.
    #[error("ABI decode failed for {what}: {reason} (raw 0x{raw})")]
    Abi {
        what: &'static str,
        reason: String,
        raw: String,
    },
    #[error("CBOR decode failed: {0}")]
    Cbor(String),
    #[error("Preimage entry {index} is malformed: {reason}")]
    PreimageEntry { index: usize, reason: String },
    #[error("Invalid content identifier `{text}`: {reason}")]
    Identifier { text: String, reason: String },
    #[error("Invalid hex input: {0}")]
    Hex(String),
    #[error("Invalid seed `{0}`: expected a decimal uint256")]
    Seed(String),
    #[error("Invalid archive: {0}")]
    Archive(String),
    #[error("Invalid dag-pb node {cid}: {reason}")]
    DagPb { cid: String, reason: String },
    #[error("Unsupported UnixFS node {cid}: {reason}")]
    UnixFs { cid: String, reason: String },
    #[error("Invalid NFT metadata: {0}")]
    Metadata(String),
}

/// Failures touching the in-memory block store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Block not found: {0}")]
    NotFound(String),
    #[error("Digest mismatch for {cid}: expected 0x{expected}, computed 0x{computed}")]
    DigestMismatch {
        cid: String,
        expected: String,
        computed: String,
    },
    #[error("Unsupported hash code: 0x{0:x}")]
    UnsupportedHash(u64),
    #[error("Path `{path}` not found under {root}")]
    PathNotFound { root: String, path: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type DecodeResult<T> = core::result::Result<T, DecodeError>;
pub type StoreResult<T> = core::result::Result<T, StoreError>;
