// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Content identifier and hex helpers.

use cid::Cid;

use crate::error::{DecodeError, DecodeResult};

pub const IPFS_SCHEME: &str = "ipfs://";

/// Multicodec codes the store knows how to walk.
pub const CODEC_RAW: u64 = 0x55;
pub const CODEC_DAG_PB: u64 = 0x70;
pub const CODEC_DAG_CBOR: u64 = 0x71;

/// Parses a CID, accepting an optional `ipfs://` prefix.
pub fn parse_cid(text: &str) -> DecodeResult<Cid> {
    let trimmed = text.strip_prefix(IPFS_SCHEME).unwrap_or(text);
    Cid::try_from(trimmed).map_err(|e| DecodeError::Identifier {
        text: text.to_string(),
        reason: e.to_string(),
    })
}

pub fn strip_0x(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Decodes hex with or without a leading `0x`.
pub fn decode_hex(text: &str) -> DecodeResult<Vec<u8>> {
    hex::decode(strip_0x(text)).map_err(|e| DecodeError::Hex(format!("{text}: {e}")))
}

/// Decodes exactly 32 bytes of hex.
pub fn decode_hex32(text: &str) -> DecodeResult<[u8; 32]> {
    let bytes = decode_hex(text)?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| DecodeError::Hex(format!("{text}: expected 32 bytes, got {}", b.len())))
}
