// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Preimage block listings.
//!
//! A preimage is CBOR. When the top level is an array, every element is a
//! two element array `[identifierText, byteArray]`. The byte array may be a
//! CBOR byte string or an array of integers in `0..=255`.

use ciborium::value::Value;

use crate::error::{DecodeError, DecodeResult};
use crate::types::BlockEntry;

/// Decoded preimage plus any non-fatal diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreimageListing {
    pub entries: Vec<BlockEntry>,
    pub diagnostic: Option<String>,
}

impl PreimageListing {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn decode_preimage(bytes: &[u8]) -> DecodeResult<PreimageListing> {
    let mut reader = bytes;
    let value: Value =
        ciborium::de::from_reader(&mut reader).map_err(|e| DecodeError::Cbor(e.to_string()))?;
    if !reader.is_empty() {
        return Err(DecodeError::Cbor(format!(
            "{} trailing bytes after preimage",
            reader.len()
        )));
    }

    let items = match value {
        Value::Array(items) => items,
        other => {
            let diagnostic = format!("Decoded preimage is not an array ({})", kind(&other));
            tracing::warn!("{}", diagnostic);
            return Ok(PreimageListing {
                entries: Vec::new(),
                diagnostic: Some(diagnostic),
            });
        }
    };

    let entries = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_entry(index, item))
        .collect::<DecodeResult<Vec<_>>>()?;

    Ok(PreimageListing {
        entries,
        diagnostic: None,
    })
}

fn decode_entry(index: usize, item: Value) -> DecodeResult<BlockEntry> {
    let malformed = |reason: String| DecodeError::PreimageEntry { index, reason };

    let pair = match item {
        Value::Array(pair) if pair.len() == 2 => pair,
        Value::Array(pair) => return Err(malformed(format!("expected 2 elements, found {}", pair.len()))),
        other => return Err(malformed(format!("expected an array, found {}", kind(&other)))),
    };
    let mut pair = pair.into_iter();

    let identifier = match pair.next() {
        Some(Value::Text(text)) => text,
        Some(other) => return Err(malformed(format!("identifier is {}, not text", kind(&other)))),
        None => return Err(malformed("missing identifier".to_string())),
    };

    let bytes = match pair.next() {
        Some(Value::Bytes(bytes)) => bytes,
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::Integer(i) => u8::try_from(*i).ok(),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| malformed("byte array holds a value outside 0..=255".to_string()))?,
        Some(other) => return Err(malformed(format!("block is {}, not bytes", kind(&other)))),
        None => return Err(malformed("missing block bytes".to_string())),
    };

    Ok(BlockEntry { identifier, bytes })
}

/// Encodes a listing; byte arrays become CBOR byte strings.
pub fn encode_preimage(entries: &[BlockEntry]) -> Vec<u8> {
    let value = Value::Array(
        entries
            .iter()
            .map(|entry| {
                Value::Array(vec![
                    Value::Text(entry.identifier.clone()),
                    Value::Bytes(entry.bytes.clone()),
                ])
            })
            .collect(),
    );
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = ciborium::ser::into_writer(&value, &mut buf);
    buf
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Integer(_) => "an integer",
        Value::Bytes(_) => "a byte string",
        Value::Float(_) => "a float",
        Value::Text(_) => "text",
        Value::Bool(_) => "a bool",
        Value::Null => "null",
        Value::Tag(..) => "a tagged value",
        Value::Array(_) => "an array",
        Value::Map(_) => "a map",
        _ => "an unknown value",
    }
}
