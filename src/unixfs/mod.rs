// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Read-only UnixFS over the block store.
//!
//! Enough of UnixFS to list a directory, follow named paths and read files
//! split over dag-pb trees with raw leaves. Sharded directories are not
//! handled.

pub mod pb;

use cid::Cid;
use prost::Message;
use rustc_hash::FxHashSet;

use crate::error::{DecodeError, StoreError, StoreResult};
use crate::storage::BlockStore;
use crate::types::id::{parse_cid, CODEC_DAG_PB, CODEC_RAW};
use crate::types::NftMetadata;
use pb::{DataType, PbLink, PbNode, UnixFsData};

pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub cid: Cid,
    pub size: u64,
}

/// Metadata and image of an NFT directory.
#[derive(Debug, Clone, PartialEq)]
pub struct NftView {
    pub metadata_cid: Cid,
    pub metadata: NftMetadata,
    pub image_cid: Cid,
    pub image: Vec<u8>,
}

impl NftView {
    pub fn image_mime(&self) -> &'static str {
        sniff_image_type(&self.image)
    }
}

pub fn decode_node(cid: &Cid, bytes: &[u8]) -> Result<PbNode, DecodeError> {
    PbNode::decode(bytes).map_err(|e| DecodeError::DagPb {
        cid: cid.to_string(),
        reason: e.to_string(),
    })
}

pub fn link_cid(parent: &Cid, link: &PbLink) -> Result<Cid, DecodeError> {
    let hash = link.hash.as_deref().ok_or_else(|| DecodeError::DagPb {
        cid: parent.to_string(),
        reason: "link without hash".to_string(),
    })?;
    Cid::try_from(hash).map_err(|e| DecodeError::DagPb {
        cid: parent.to_string(),
        reason: format!("bad link hash: {e}"),
    })
}

fn unixfs_data(cid: &Cid, node: &PbNode) -> Result<(DataType, UnixFsData), DecodeError> {
    let raw = node.data.as_deref().ok_or_else(|| DecodeError::UnixFs {
        cid: cid.to_string(),
        reason: "dag-pb node carries no UnixFS data".to_string(),
    })?;
    let data = UnixFsData::decode(raw).map_err(|e| DecodeError::UnixFs {
        cid: cid.to_string(),
        reason: e.to_string(),
    })?;
    let code = data.data_type.unwrap_or_default();
    let kind = DataType::from_code(code).ok_or_else(|| DecodeError::UnixFs {
        cid: cid.to_string(),
        reason: format!("unknown data type {code}"),
    })?;
    Ok((kind, data))
}

fn unsupported(cid: &Cid, reason: impl Into<String>) -> StoreError {
    DecodeError::UnixFs {
        cid: cid.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// Lists a directory.
pub fn ls(store: &BlockStore, cid: &Cid) -> StoreResult<Vec<DirEntry>> {
    if cid.codec() != CODEC_DAG_PB {
        return Err(unsupported(cid, "not a directory"));
    }
    let node = decode_node(cid, store.require(cid)?)?;
    match unixfs_data(cid, &node)?.0 {
        DataType::Directory => {}
        DataType::HamtShard => return Err(unsupported(cid, "sharded directories are not supported")),
        other => return Err(unsupported(cid, format!("{other:?} node is not a directory"))),
    }

    node.links
        .iter()
        .map(|link| -> StoreResult<DirEntry> {
            Ok(DirEntry {
                name: link.name.clone().unwrap_or_default(),
                cid: link_cid(cid, link)?,
                size: link.tsize.unwrap_or_default(),
            })
        })
        .collect()
}

/// Reads a whole file.
pub fn cat(store: &BlockStore, cid: &Cid) -> StoreResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut path = FxHashSet::default();
    cat_into(store, cid, &mut path, &mut out)?;
    Ok(out)
}

/// `path` holds the CIDs between the file root and `cid`; meeting one again
/// means the file links back into itself.
fn cat_into(
    store: &BlockStore,
    cid: &Cid,
    path: &mut FxHashSet<Cid>,
    out: &mut Vec<u8>,
) -> StoreResult<()> {
    let bytes = store.require(cid)?;
    match cid.codec() {
        CODEC_RAW => {
            out.extend_from_slice(bytes);
            Ok(())
        }
        CODEC_DAG_PB => {
            let node = decode_node(cid, bytes)?;
            let (kind, data) = unixfs_data(cid, &node)?;
            match kind {
                DataType::File | DataType::Raw => {
                    if let Some(chunk) = data.data {
                        out.extend_from_slice(&chunk);
                    }
                    if !path.insert(*cid) {
                        return Err(unsupported(cid, "file links back into itself"));
                    }
                    for link in &node.links {
                        cat_into(store, &link_cid(cid, link)?, path, out)?;
                    }
                    path.remove(cid);
                    Ok(())
                }
                DataType::Directory | DataType::HamtShard => Err(unsupported(cid, "is a directory")),
                other => Err(unsupported(cid, format!("cannot read {other:?} node"))),
            }
        }
        codec => Err(unsupported(cid, format!("codec 0x{codec:x} is not a file"))),
    }
}

/// Follows `/`-separated names from `root`.
pub fn resolve_path(store: &BlockStore, root: &Cid, path: &str) -> StoreResult<Cid> {
    let mut current = *root;
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current = ls(store, &current)?
            .into_iter()
            .find(|entry| entry.name == segment)
            .map(|entry| entry.cid)
            .ok_or_else(|| StoreError::PathNotFound {
                root: root.to_string(),
                path: path.to_string(),
            })?;
    }
    Ok(current)
}

/// Reads `metadata.json` under `label` and the image it points to.
pub fn view_nft(store: &BlockStore, label: &str) -> StoreResult<NftView> {
    let root = parse_cid(label)?;
    let metadata_cid = resolve_path(store, &root, METADATA_FILE)?;
    let raw = cat(store, &metadata_cid)?;
    let metadata: NftMetadata =
        serde_json::from_slice(&raw).map_err(|e| DecodeError::Metadata(e.to_string()))?;

    let image_cid = parse_cid(&metadata.image)?;
    let image = cat(store, &image_cid)?;

    Ok(NftView {
        metadata_cid,
        metadata,
        image_cid,
        image,
    })
}

pub fn sniff_image_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

/// Encodes a single-block UnixFS file.
pub fn encode_file(content: &[u8]) -> Vec<u8> {
    let data = UnixFsData {
        data_type: Some(DataType::File.code()),
        data: Some(content.to_vec()),
        filesize: Some(content.len() as u64),
        blocksizes: Vec::new(),
    };
    PbNode {
        data: Some(data.encode_to_vec()),
        links: Vec::new(),
    }
    .encode_to_vec()
}

/// Encodes a UnixFS file whose content lives in the linked children.
pub fn encode_chunked_file(children: &[(Cid, u64)]) -> Vec<u8> {
    let data = UnixFsData {
        data_type: Some(DataType::File.code()),
        data: None,
        filesize: Some(children.iter().map(|(_, len)| len).sum()),
        blocksizes: children.iter().map(|(_, len)| *len).collect(),
    };
    PbNode {
        data: Some(data.encode_to_vec()),
        links: children
            .iter()
            .map(|(cid, len)| PbLink {
                hash: Some(cid.to_bytes()),
                name: Some(String::new()),
                tsize: Some(*len),
            })
            .collect(),
    }
    .encode_to_vec()
}

/// Encodes a flat UnixFS directory.
pub fn encode_directory(entries: &[DirEntry]) -> Vec<u8> {
    let data = UnixFsData {
        data_type: Some(DataType::Directory.code()),
        ..Default::default()
    };
    PbNode {
        data: Some(data.encode_to_vec()),
        links: entries
            .iter()
            .map(|entry| PbLink {
                hash: Some(entry.cid.to_bytes()),
                name: Some(entry.name.clone()),
                tsize: Some(entry.size),
            })
            .collect(),
    }
    .encode_to_vec()
}
