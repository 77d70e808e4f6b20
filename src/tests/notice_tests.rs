// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::DecodeError;
use crate::notice::{
    decode_notice, decode_notice_call, encode_notice_call, encode_notice_call_with,
    encode_notice_payload, extract_notice_call, notice_selector, service_response, NoticeDecoding,
};
use crate::types::NoticePayload;
use proptest::prelude::*;
use serde_json::json;

fn sample_payload() -> NoticePayload {
    NoticePayload {
        label: "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi".to_string(),
        digest: [0xab; 32],
    }
}

#[test]
fn test_notice_selector_matches_signature() {
    // keccak256("Notice(bytes)")[..4]
    assert_eq!(notice_selector(), [0xc2, 0x58, 0xd6, 0xe5]);
}

#[test]
fn test_decode_notice_roundtrip() {
    let payload = sample_payload();
    let response = service_response("0x01", &encode_notice_call(&payload));

    let decoded = decode_notice(&response, NoticeDecoding::FullCall).unwrap();
    assert_eq!(decoded, Some(payload));
}

#[test]
fn test_missing_path_is_absent() {
    let cases = vec![
        json!({}),
        json!({"service_response": []}),
        json!({"service_response": [null]}),
        json!({"service_response": [null, null]}),
        json!({"service_response": [null, {}]}),
        json!({"other": 1}),
    ];
    for response in cases {
        let decoded = decode_notice(&response, NoticeDecoding::FullCall).unwrap();
        assert!(decoded.is_none(), "expected no notice for {response}");
    }
}

#[test]
fn test_present_map_with_bad_shape_names_field() {
    let response = json!({"service_response": [null, {"0xfeed": [[0, "not bytes"]]}]});
    let err = decode_notice(&response, NoticeDecoding::FullCall).unwrap_err();
    match err {
        DecodeError::NoticeShape { path } => assert!(path.contains("0xfeed"), "{path}"),
        other => panic!("unexpected error {other:?}"),
    }

    let response = json!({"service_response": [null, {"k": [[0, [1, 2, 300]]]}]});
    assert!(matches!(
        decode_notice(&response, NoticeDecoding::StripSelector),
        Err(DecodeError::NoticeShape { .. })
    ));
}

#[test]
fn test_first_key_in_document_order_wins() {
    let first = sample_payload();
    let second = NoticePayload {
        label: "second".to_string(),
        digest: [0x01; 32],
    };
    let raw = format!(
        r#"{{"service_response":[null,{{"zz":[[0,{}]],"aa":[[0,{}]]}}]}}"#,
        serde_json::to_string(&encode_notice_call(&first)).unwrap(),
        serde_json::to_string(&encode_notice_call(&second)).unwrap(),
    );
    let response: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let decoded = decode_notice(&response, NoticeDecoding::FullCall).unwrap();
    assert_eq!(decoded, Some(first));
}

#[test]
fn test_zero_selector_scenario_strips_selector() {
    let payload = sample_payload();
    let call = encode_notice_call_with([0, 0, 0, 0], &payload);
    let response = json!({"service_response": [null, {"k": [[0, call]]}]});

    let decoded = decode_notice(&response, NoticeDecoding::StripSelector).unwrap();
    assert_eq!(decoded, Some(payload));
}

#[test]
fn test_selector_mismatch_is_fatal_under_full_call() {
    let call = encode_notice_call_with([0, 0, 0, 0], &sample_payload());
    let err = decode_notice_call(&call, NoticeDecoding::FullCall).unwrap_err();
    match err {
        DecodeError::SelectorMismatch { found, raw, .. } => {
            assert_eq!(found, "00000000");
            assert_eq!(raw, hex::encode(&call));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_malformed_call_data_is_decode_error() {
    let cases: Vec<Vec<u8>> = vec![
        vec![],
        vec![1, 2, 3],
        notice_selector().to_vec(),
        {
            let mut call = notice_selector().to_vec();
            call.extend_from_slice(&[0xff; 40]);
            call
        },
    ];
    for call in cases {
        let result = decode_notice_call(&call, NoticeDecoding::FullCall);
        assert!(matches!(result, Err(DecodeError::Abi { .. })), "call {:?} gave {:?}", call, result);
    }
}

#[test]
fn test_inner_payload_error_carries_raw_hex() {
    let mut call = notice_selector().to_vec();
    call.extend(ethers::abi::encode(&[ethers::abi::Token::Bytes(vec![0xde, 0xad])]));

    match decode_notice_call(&call, NoticeDecoding::FullCall).unwrap_err() {
        DecodeError::Abi { what, raw, .. } => {
            assert_eq!(what, "notice payload");
            assert_eq!(raw, "dead");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_extract_returns_raw_call_bytes() {
    let call = encode_notice_call(&sample_payload());
    let response = service_response("digest", &call);
    assert_eq!(extract_notice_call(&response).unwrap(), Some(call));
}

#[test]
fn test_notice_decoding_from_str() {
    assert_eq!("full".parse::<NoticeDecoding>().unwrap(), NoticeDecoding::FullCall);
    assert_eq!("strip-selector".parse::<NoticeDecoding>().unwrap(), NoticeDecoding::StripSelector);
    assert!("other".parse::<NoticeDecoding>().is_err());
}

proptest! {
    #[test]
    fn prop_notice_roundtrip(label in ".{0,80}", digest in any::<[u8; 32]>()) {
        let payload = NoticePayload { label, digest };
        let inner = encode_notice_payload(&payload);
        let response = service_response("k", &encode_notice_call(&payload));
        prop_assert!(!inner.is_empty());
        prop_assert_eq!(decode_notice(&response, NoticeDecoding::FullCall).unwrap(), Some(payload));
    }
}
