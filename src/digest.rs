// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Block digest verification against a CID multihash.

use cid::Cid;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::error::{StoreError, StoreResult};

pub const IDENTITY: u64 = 0x00;
pub const SHA2_256: u64 = 0x12;
pub const KECCAK_256: u64 = 0x1b;
pub const BLAKE3: u64 = 0x1e;

/// Hashes `bytes` with the multihash function `code`.
pub fn hash_with(code: u64, bytes: &[u8]) -> StoreResult<Vec<u8>> {
    match code {
        IDENTITY => Ok(bytes.to_vec()),
        SHA2_256 => Ok(Sha256::digest(bytes).to_vec()),
        KECCAK_256 => Ok(Keccak256::digest(bytes).to_vec()),
        BLAKE3 => Ok(blake3::hash(bytes).as_bytes().to_vec()),
        other => Err(StoreError::UnsupportedHash(other)),
    }
}

/// Checks that `bytes` hash to the digest embedded in `cid`.
pub fn verify_block(cid: &Cid, bytes: &[u8]) -> StoreResult<()> {
    let mh = cid.hash();
    let computed = hash_with(mh.code(), bytes)?;
    let expected = mh.digest();
    let matches = if mh.code() == IDENTITY {
        computed == expected
    } else {
        // Truncated multihashes compare on their prefix.
        usize::from(mh.size()) == expected.len()
            && expected.len() <= computed.len()
            && &computed[..expected.len()] == expected
    };
    if !matches {
        return Err(StoreError::DigestMismatch {
            cid: cid.to_string(),
            expected: hex::encode(expected),
            computed: hex::encode(&computed),
        });
    }
    Ok(())
}

/// Builds a CIDv1 for `bytes` under `codec`, hashed with `code`.
pub fn cid_for(codec: u64, code: u64, bytes: &[u8]) -> StoreResult<Cid> {
    let digest = hash_with(code, bytes)?;
    let mh = cid::multihash::Multihash::<64>::wrap(code, &digest)
        .map_err(|_| StoreError::UnsupportedHash(code))?;
    Ok(Cid::new_v1(codec, mh))
}
