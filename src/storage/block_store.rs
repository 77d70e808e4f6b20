// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory content-addressed block store.

use cid::Cid;
use rustc_hash::FxHashMap;

use crate::digest::verify_block;
use crate::error::{StoreError, StoreResult};
use crate::types::id::parse_cid;
use crate::types::BlockEntry;

/// Map from CID to block bytes. Grows for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStore {
    blocks: FxHashMap<Cid, Vec<u8>>,
    verify: bool,
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore {
    /// Store that checks every block against its CID digest.
    pub fn new() -> Self {
        Self::with_verification(true)
    }

    /// Store that accepts any bytes under any identifier.
    pub fn unchecked() -> Self {
        Self::with_verification(false)
    }

    pub fn with_verification(verify: bool) -> Self {
        Self {
            blocks: FxHashMap::default(),
            verify,
        }
    }

    pub fn verifies(&self) -> bool {
        self.verify
    }

    /// Inserts a block. Re-inserting an identifier overwrites it.
    pub fn put(&mut self, cid: Cid, bytes: Vec<u8>) -> StoreResult<()> {
        if self.verify {
            verify_block(&cid, &bytes)?;
        }
        self.blocks.insert(cid, bytes);
        Ok(())
    }

    pub fn get(&self, cid: &Cid) -> Option<&[u8]> {
        self.blocks.get(cid).map(Vec::as_slice)
    }

    /// Like [`get`](Self::get) but missing blocks are an error.
    pub fn require(&self, cid: &Cid) -> StoreResult<&[u8]> {
        self.get(cid).ok_or_else(|| StoreError::NotFound(cid.to_string()))
    }

    pub fn contains(&self, cid: &Cid) -> bool {
        self.blocks.contains_key(cid)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// CIDs in string order, for stable listings.
    pub fn cids(&self) -> Vec<Cid> {
        let mut cids: Vec<Cid> = self.blocks.keys().copied().collect();
        cids.sort_by_key(|c| c.to_string());
        cids
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Cid, &[u8])> {
        self.blocks.iter().map(|(c, b)| (c, b.as_slice()))
    }
}

/// Inserts every entry of a decoded preimage.
///
/// All entries are parsed and checked before the first insert, so a bad
/// entry leaves the store untouched.
pub fn load_blocks(store: &mut BlockStore, entries: &[BlockEntry]) -> StoreResult<Vec<Cid>> {
    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        let cid = parse_cid(&entry.identifier)?;
        if store.verify {
            verify_block(&cid, &entry.bytes)?;
        }
        parsed.push(cid);
    }

    for (index, (cid, entry)) in parsed.iter().zip(entries).enumerate() {
        store.blocks.insert(*cid, entry.bytes.clone());
        tracing::debug!("Stored block {} with CID: {}", index, cid);
    }
    Ok(parsed)
}
