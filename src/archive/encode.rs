// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! CARv1 encoding.

use ciborium::value::Value;
use cid::Cid;
use rustc_hash::FxHashSet;

use crate::error::{StoreError, StoreResult};
use crate::storage::links::{cbor_link, links};
use crate::storage::BlockStore;
use crate::types::id::parse_cid;

pub const CAR_VERSION: u64 = 1;

/// Writes a CARv1 stream into memory: a header, then one frame per block.
pub struct CarWriter {
    buf: Vec<u8>,
    blocks: usize,
}

impl CarWriter {
    pub fn new(roots: &[Cid]) -> Self {
        let header = Value::Map(vec![
            (
                Value::Text("roots".to_string()),
                Value::Array(roots.iter().map(cbor_link).collect()),
            ),
            (Value::Text("version".to_string()), Value::Integer(CAR_VERSION.into())),
        ]);
        let mut encoded = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = ciborium::ser::into_writer(&header, &mut encoded);

        let mut buf = Vec::with_capacity(encoded.len() + 10);
        write_varint(&mut buf, encoded.len() as u64);
        buf.extend_from_slice(&encoded);
        Self { buf, blocks: 0 }
    }

    pub fn put(&mut self, cid: &Cid, bytes: &[u8]) {
        let cid_bytes = cid.to_bytes();
        write_varint(&mut self.buf, (cid_bytes.len() + bytes.len()) as u64);
        self.buf.extend_from_slice(&cid_bytes);
        self.buf.extend_from_slice(bytes);
        self.blocks += 1;
    }

    pub fn block_count(&self) -> usize {
        self.blocks
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

fn write_varint(buf: &mut Vec<u8>, n: u64) {
    let mut scratch = unsigned_varint::encode::u64_buffer();
    buf.extend_from_slice(unsigned_varint::encode::u64(n, &mut scratch));
}

/// Collects the blocks reachable from `root`, depth first in link order.
///
/// Fails without producing anything if the root or any reachable block is
/// missing from the store.
pub fn collect_dag<'a>(root: &Cid, store: &'a BlockStore) -> StoreResult<Vec<(Cid, &'a [u8])>> {
    if !store.contains(root) {
        return Err(StoreError::NotFound(root.to_string()));
    }

    let mut seen = FxHashSet::default();
    let mut stack = vec![*root];
    let mut out = Vec::new();

    while let Some(cid) = stack.pop() {
        if !seen.insert(cid) {
            continue;
        }
        let bytes = store.require(&cid)?;
        let children = links(&cid, bytes)?;
        stack.extend(children.into_iter().rev());
        out.push((cid, bytes));
    }
    Ok(out)
}

/// Serializes the DAG rooted at `root` into a CARv1 archive.
pub fn export_cid(root: &Cid, store: &BlockStore) -> StoreResult<Vec<u8>> {
    let blocks = collect_dag(root, store)?;

    let mut writer = CarWriter::new(std::slice::from_ref(root));
    for (cid, bytes) in &blocks {
        writer.put(cid, bytes);
    }
    tracing::debug!("Exported {} blocks under {}", writer.block_count(), root);
    Ok(writer.finish())
}

/// Parses `root` (optionally `ipfs://` prefixed) and exports its DAG.
pub fn export_archive(root: &str, store: &BlockStore) -> StoreResult<Vec<u8>> {
    let cid = parse_cid(root)?;
    export_cid(&cid, store)
}
