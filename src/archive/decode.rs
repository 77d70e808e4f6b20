// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! CARv1 decoding.

use std::io::Cursor;

use ciborium::value::Value;
use cid::Cid;

use crate::archive::encode::CAR_VERSION;
use crate::error::{DecodeError, DecodeResult, StoreResult};
use crate::storage::BlockStore;

#[derive(Debug, Clone, PartialEq)]
pub struct CarArchive {
    pub roots: Vec<Cid>,
    pub blocks: Vec<(Cid, Vec<u8>)>,
}

fn bad(reason: impl Into<String>) -> DecodeError {
    DecodeError::Archive(reason.into())
}

fn read_frame(buf: &[u8]) -> DecodeResult<(&[u8], &[u8])> {
    let (len, rest) =
        unsigned_varint::decode::u64(buf).map_err(|e| bad(format!("bad frame length: {e}")))?;
    let len = usize::try_from(len).map_err(|_| bad("frame length overflows"))?;
    if rest.len() < len {
        return Err(bad(format!("truncated frame: need {len} bytes, have {}", rest.len())));
    }
    Ok(rest.split_at(len))
}

fn decode_roots(header: &[u8]) -> DecodeResult<Vec<Cid>> {
    let value: Value =
        ciborium::de::from_reader(header).map_err(|e| bad(format!("bad header: {e}")))?;
    let Value::Map(pairs) = value else {
        return Err(bad("header is not a map"));
    };

    let field = |name: &str| {
        pairs
            .iter()
            .find(|(k, _)| matches!(k, Value::Text(t) if t == name))
            .map(|(_, v)| v)
    };

    match field("version") {
        Some(Value::Integer(v)) if u64::try_from(*v).ok() == Some(CAR_VERSION) => {}
        _ => return Err(bad("unsupported CAR version")),
    }

    let Some(Value::Array(roots)) = field("roots") else {
        return Err(bad("header has no roots"));
    };
    roots
        .iter()
        .map(|root| match root {
            Value::Tag(42, inner) => match inner.as_ref() {
                Value::Bytes(bytes) if bytes.first() == Some(&0) => {
                    Cid::try_from(&bytes[1..]).map_err(|e| bad(format!("bad root: {e}")))
                }
                _ => Err(bad("root is not a binary CID")),
            },
            _ => Err(bad("root is not a CID link")),
        })
        .collect()
}

/// Reads a CARv1 archive.
pub fn read_archive(bytes: &[u8]) -> DecodeResult<CarArchive> {
    let (header, mut rest) = read_frame(bytes)?;
    let roots = decode_roots(header)?;

    let mut blocks = Vec::new();
    while !rest.is_empty() {
        let (frame, tail) = read_frame(rest)?;
        let mut cursor = Cursor::new(frame);
        let cid = Cid::read_bytes(&mut cursor).map_err(|e| bad(format!("bad block CID: {e}")))?;
        let data = &frame[cursor.position() as usize..];
        blocks.push((cid, data.to_vec()));
        rest = tail;
    }

    Ok(CarArchive { roots, blocks })
}

/// Loads every block of an archive into `store` and returns its roots.
pub fn import_archive(bytes: &[u8], store: &mut BlockStore) -> StoreResult<Vec<Cid>> {
    let archive = read_archive(bytes)?;
    for (cid, data) in archive.blocks {
        store.put(cid, data)?;
    }
    Ok(archive.roots)
}
