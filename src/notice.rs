// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Notice extraction and ABI decoding.
//!
//! The coprocessor answers a task with a JSON document whose
//! `service_response[1]` is a map from output digest to a list of
//! `[index, bytes]` outputs. The first output of the first digest is an
//! ABI-encoded `Notice(bytes)` call whose argument is itself an ABI-encoded
//! `(string label, bytes32 digest)` tuple.

use ethers::abi::{self, ParamType, Token};
use serde_json::{json, Value};

use crate::error::{DecodeError, DecodeResult};
use crate::types::NoticePayload;

pub const NOTICE_SIGNATURE: &str = "Notice(bytes)";
const SELECTOR_LEN: usize = 4;

/// How the 4-byte selector in front of the notice call is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeDecoding {
    /// Require the `Notice(bytes)` selector, then decode the argument.
    #[default]
    FullCall,
    /// Drop the first four bytes unchecked.
    StripSelector,
}

impl std::str::FromStr for NoticeDecoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" | "full-call" => Ok(Self::FullCall),
            "strip" | "strip-selector" => Ok(Self::StripSelector),
            other => Err(format!("unknown notice decoding `{other}`")),
        }
    }
}

pub fn notice_selector() -> [u8; 4] {
    ethers::utils::id(NOTICE_SIGNATURE)
}

/// Decodes the notice carried by a service response.
///
/// Returns `Ok(None)` when the response carries no notice yet.
pub fn decode_notice(response: &Value, mode: NoticeDecoding) -> DecodeResult<Option<NoticePayload>> {
    match extract_notice_call(response)? {
        Some(call) => decode_notice_call(&call, mode).map(Some),
        None => Ok(None),
    }
}

/// Locates `service_response[1][<first key>][0][1]` and returns its bytes.
pub fn extract_notice_call(response: &Value) -> DecodeResult<Option<Vec<u8>>> {
    let outputs = match response.get("service_response").and_then(|r| r.get(1)) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let map = outputs.as_object().ok_or_else(|| shape("service_response[1]".to_string()))?;

    let Some((key, entry)) = map.iter().next() else {
        return Ok(None);
    };

    let path = format!("service_response[1][\"{key}\"][0][1]");
    let raw = entry
        .get(0)
        .and_then(|output| output.get(1))
        .and_then(Value::as_array)
        .ok_or_else(|| shape(path.clone()))?;

    raw.iter()
        .map(|b| b.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect::<Option<Vec<u8>>>()
        .map(Some)
        .ok_or_else(|| shape(path))
}

/// Decodes raw `Notice(bytes)` call data.
pub fn decode_notice_call(call: &[u8], mode: NoticeDecoding) -> DecodeResult<NoticePayload> {
    let inner = unwrap_notice_call(call, mode)?;
    tracing::debug!("Notice inner payload: 0x{}", hex::encode(&inner));
    decode_notice_payload(&inner)
}

/// Returns the `bytes` argument of `Notice(bytes)` call data.
pub fn unwrap_notice_call(call: &[u8], mode: NoticeDecoding) -> DecodeResult<Vec<u8>> {
    if call.len() < SELECTOR_LEN {
        return Err(abi_error("notice call", "shorter than a function selector", call));
    }
    let (selector, args) = call.split_at(SELECTOR_LEN);

    if mode == NoticeDecoding::FullCall {
        let expected = notice_selector();
        if selector != expected {
            return Err(DecodeError::SelectorMismatch {
                expected: hex::encode(expected),
                found: hex::encode(selector),
                raw: hex::encode(call),
            });
        }
    }

    let tokens = abi::decode(&[ParamType::Bytes], args)
        .map_err(|e| abi_error("notice call", e, call))?;
    match tokens.into_iter().next() {
        Some(Token::Bytes(inner)) => Ok(inner),
        _ => Err(abi_error("notice call", "expected a single bytes argument", call)),
    }
}

/// Decodes the inner `(string, bytes32)` tuple.
pub fn decode_notice_payload(inner: &[u8]) -> DecodeResult<NoticePayload> {
    let tokens = abi::decode(&[ParamType::String, ParamType::FixedBytes(32)], inner)
        .map_err(|e| abi_error("notice payload", e, inner))?;

    match tokens.as_slice() {
        [Token::String(label), Token::FixedBytes(digest)] => {
            let digest: [u8; 32] = digest
                .as_slice()
                .try_into()
                .map_err(|_| abi_error("notice payload", "digest is not 32 bytes", inner))?;
            Ok(NoticePayload {
                label: label.clone(),
                digest,
            })
        }
        _ => Err(abi_error("notice payload", "expected (string, bytes32)", inner)),
    }
}

/// ABI-encodes a `(string, bytes32)` notice payload.
pub fn encode_notice_payload(payload: &NoticePayload) -> Vec<u8> {
    abi::encode(&[
        Token::String(payload.label.clone()),
        Token::FixedBytes(payload.digest.to_vec()),
    ])
}

/// Builds `Notice(bytes)` call data behind the given selector.
pub fn encode_notice_call_with(selector: [u8; 4], payload: &NoticePayload) -> Vec<u8> {
    let mut call = selector.to_vec();
    call.extend(abi::encode(&[Token::Bytes(encode_notice_payload(payload))]));
    call
}

pub fn encode_notice_call(payload: &NoticePayload) -> Vec<u8> {
    encode_notice_call_with(notice_selector(), payload)
}

/// Wraps notice call data the way the coprocessor reports task outputs.
pub fn service_response(output_key: &str, call: &[u8]) -> Value {
    json!({
        "service_response": [
            Value::Null,
            { output_key: [[0, call]] }
        ]
    })
}

fn shape(path: String) -> DecodeError {
    DecodeError::NoticeShape { path }
}

fn abi_error(what: &'static str, reason: impl ToString, raw: &[u8]) -> DecodeError {
    DecodeError::Abi {
        what,
        reason: reason.to_string(),
        raw: hex::encode(raw),
    }
}
