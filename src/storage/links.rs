// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Outgoing links of a block, by codec.

use ciborium::value::Value;
use cid::Cid;

use crate::error::{DecodeError, DecodeResult};
use crate::types::id::{CODEC_DAG_CBOR, CODEC_DAG_PB, CODEC_RAW};
use crate::unixfs::{decode_node, link_cid};

/// CBOR tag for a CID link in dag-cbor.
const CID_TAG: u64 = 42;

/// Returns the CIDs a block links to, in encoding order.
///
/// Blocks with codecs the store cannot interpret are treated as leaves.
pub fn links(cid: &Cid, bytes: &[u8]) -> DecodeResult<Vec<Cid>> {
    match cid.codec() {
        CODEC_RAW => Ok(Vec::new()),
        CODEC_DAG_PB => {
            let node = decode_node(cid, bytes)?;
            node.links.iter().map(|link| link_cid(cid, link)).collect()
        }
        CODEC_DAG_CBOR => {
            let value: Value = ciborium::de::from_reader(bytes)
                .map_err(|e| DecodeError::Cbor(format!("{cid}: {e}")))?;
            let mut out = Vec::new();
            collect_cbor_links(&value, &mut out)?;
            Ok(out)
        }
        other => {
            tracing::debug!("Codec 0x{:x} of {} has no known link format", other, cid);
            Ok(Vec::new())
        }
    }
}

fn collect_cbor_links(value: &Value, out: &mut Vec<Cid>) -> DecodeResult<()> {
    match value {
        Value::Tag(CID_TAG, inner) => match inner.as_ref() {
            // Binary CIDs in dag-cbor carry a leading multibase identity byte.
            Value::Bytes(bytes) if bytes.first() == Some(&0) => {
                let cid = Cid::try_from(&bytes[1..]).map_err(|e| DecodeError::Identifier {
                    text: hex::encode(bytes),
                    reason: e.to_string(),
                })?;
                out.push(cid);
                Ok(())
            }
            _ => Err(DecodeError::Cbor("tag 42 does not wrap a binary CID".to_string())),
        },
        Value::Tag(_, inner) => collect_cbor_links(inner, out),
        Value::Array(items) => items.iter().try_for_each(|item| collect_cbor_links(item, out)),
        Value::Map(pairs) => pairs
            .iter()
            .try_for_each(|(_, v)| collect_cbor_links(v, out)),
        _ => Ok(()),
    }
}

/// Encodes a CID as a dag-cbor link value.
pub fn cbor_link(cid: &Cid) -> Value {
    let mut bytes = vec![0u8];
    bytes.extend(cid.to_bytes());
    Value::Tag(CID_TAG, Box::new(Value::Bytes(bytes)))
}
