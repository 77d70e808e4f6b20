// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

pub mod id;

/// Decoded `(string, bytes32)` tuple carried by a coprocessor notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticePayload {
    /// Content identifier text of the NFT directory.
    pub label: String,
    /// Key used to fetch the block listing preimage.
    pub digest: [u8; 32],
}

impl NoticePayload {
    /// `0x`-prefixed lowercase hex of the digest.
    pub fn digest_hex(&self) -> String {
        format!("0x{}", hex::encode(self.digest))
    }
}

/// One `[identifierText, byteArray]` pair of a decoded preimage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    pub identifier: String,
    pub bytes: Vec<u8>,
}

impl BlockEntry {
    pub fn new(identifier: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            identifier: identifier.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercase hex, two digits per byte, no separators.
    pub fn bytes_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// `metadata.json` stored next to the NFT image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Image CID, optionally `ipfs://` prefixed.
    pub image: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
