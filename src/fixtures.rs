// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Deterministic NFT scenarios for tests and the mock coprocessor.

use cid::Cid;
use ethers::types::U256;
use serde_json::Value;
use sha3::{Digest, Keccak256};

use crate::digest::{cid_for, KECCAK_256};
use crate::error::StoreResult;
use crate::notice::{encode_notice_call_with, notice_selector, service_response};
use crate::preimage::encode_preimage;
use crate::types::id::{CODEC_DAG_PB, CODEC_RAW, IPFS_SCHEME};
use crate::types::{BlockEntry, NftMetadata, NoticePayload};
use crate::unixfs::{encode_chunked_file, encode_directory, DirEntry, METADATA_FILE};

pub const IMAGE_FILE: &str = "penguins.gif";
const CHUNK: usize = 32;

/// Everything the coprocessor would hand out for one mint.
#[derive(Debug, Clone)]
pub struct NftFixture {
    pub notice: NoticePayload,
    /// Root directory holding `metadata.json` and the image.
    pub root: Cid,
    pub metadata: NftMetadata,
    pub image: Vec<u8>,
    /// `[cid, block]` listing, blocks inline.
    pub entries: Vec<BlockEntry>,
    /// CBOR of `entries`; its keccak256 is `notice.digest`.
    pub preimage: Vec<u8>,
    /// CBOR listing of `[cid, keccak256(block)]` pairs.
    pub digest_listing: Vec<u8>,
    /// Preimages the coprocessor can serve, keyed by keccak256.
    pub preimages: Vec<([u8; 32], Vec<u8>)>,
}

impl NftFixture {
    /// Service response whose notice uses the real `Notice(bytes)` selector.
    pub fn service_response(&self) -> Value {
        self.service_response_with(notice_selector())
    }

    pub fn service_response_with(&self, selector: [u8; 4]) -> Value {
        let call = encode_notice_call_with(selector, &self.notice);
        let key = format!("0x{}", hex::encode(keccak(&call)));
        service_response(&key, &call)
    }

    /// Notice whose digest points at the digest listing instead.
    pub fn digest_notice(&self) -> NoticePayload {
        NoticePayload {
            label: self.notice.label.clone(),
            digest: keccak(&self.digest_listing),
        }
    }

    pub fn preimage_for(&self, digest: &[u8; 32]) -> Option<&[u8]> {
        self.preimages
            .iter()
            .find(|(d, _)| d == digest)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

pub fn keccak(bytes: &[u8]) -> [u8; 32] {
    Keccak256::digest(bytes).into()
}

/// Pixel-free stand-in for the generated GIF: a valid header and a body
/// derived from the seed.
pub fn demo_image(seed: U256) -> Vec<u8> {
    let mut seed_bytes = [0u8; 32];
    seed.to_big_endian(&mut seed_bytes);

    let mut image = b"GIF89a".to_vec();
    image.extend_from_slice(&1200u16.to_le_bytes());
    image.extend_from_slice(&800u16.to_le_bytes());
    for round in 0u8..3 {
        image.extend(seed_bytes.iter().map(|b| b.wrapping_add(round)));
    }
    image.push(0x3b);
    image
}

/// Builds the UnixFS DAG and listings for `seed`.
pub fn nft_fixture(seed: U256) -> StoreResult<NftFixture> {
    let image = demo_image(seed);
    let mut entries = Vec::new();

    // Image: raw leaves under a chunked file node.
    let mut children = Vec::new();
    for chunk in image.chunks(CHUNK) {
        let cid = cid_for(CODEC_RAW, KECCAK_256, chunk)?;
        entries.push(BlockEntry::new(cid.to_string(), chunk));
        children.push((cid, chunk.len() as u64));
    }
    let image_node = encode_chunked_file(&children);
    let image_cid = cid_for(CODEC_DAG_PB, KECCAK_256, &image_node)?;
    entries.push(BlockEntry::new(image_cid.to_string(), image_node));

    let metadata = NftMetadata {
        name: Some(format!("Wartime Penguins #{seed}")),
        description: Some("Penguins generated by the coprocessor".to_string()),
        image: format!("{IPFS_SCHEME}{image_cid}"),
        extra: serde_json::Map::new(),
    };
    let metadata_bytes = serde_json::to_vec(&metadata).unwrap_or_default();
    let metadata_cid = cid_for(CODEC_RAW, KECCAK_256, &metadata_bytes)?;
    entries.push(BlockEntry::new(metadata_cid.to_string(), metadata_bytes.clone()));

    let directory = encode_directory(&[
        DirEntry {
            name: IMAGE_FILE.to_string(),
            cid: image_cid,
            size: image.len() as u64,
        },
        DirEntry {
            name: METADATA_FILE.to_string(),
            cid: metadata_cid,
            size: metadata_bytes.len() as u64,
        },
    ]);
    let root = cid_for(CODEC_DAG_PB, KECCAK_256, &directory)?;
    entries.push(BlockEntry::new(root.to_string(), directory));

    let preimage = encode_preimage(&entries);
    let digest_entries: Vec<BlockEntry> = entries
        .iter()
        .map(|e| BlockEntry::new(e.identifier.clone(), keccak(&e.bytes).to_vec()))
        .collect();
    let digest_listing = encode_preimage(&digest_entries);

    let mut preimages = vec![
        (keccak(&preimage), preimage.clone()),
        (keccak(&digest_listing), digest_listing.clone()),
    ];
    preimages.extend(entries.iter().map(|e| (keccak(&e.bytes), e.bytes.clone())));

    Ok(NftFixture {
        notice: NoticePayload {
            label: root.to_string(),
            digest: keccak(&preimage),
        },
        root,
        metadata,
        image,
        entries,
        preimage,
        digest_listing,
        preimages,
    })
}
