use crate::digest::{cid_for, hash_with, verify_block, BLAKE3, IDENTITY, KECCAK_256, SHA2_256};
use crate::error::StoreError;
use crate::preimage::{decode_preimage, encode_preimage};
use crate::storage::links::{cbor_link, links};
use crate::storage::{load_blocks, BlockStore};
use crate::types::id::{parse_cid, CODEC_DAG_CBOR, CODEC_RAW};
use crate::types::BlockEntry;

fn raw_entry(bytes: &[u8]) -> BlockEntry {
    let cid = cid_for(CODEC_RAW, SHA2_256, bytes).unwrap();
    BlockEntry::new(cid.to_string(), bytes)
}

#[test]
fn test_two_entry_preimage_populates_two_blocks() {
    let entries = vec![raw_entry(&[1, 2, 3]), raw_entry(&[4, 5])];
    let listing = decode_preimage(&encode_preimage(&entries)).unwrap();

    let mut store = BlockStore::new();
    let cids = load_blocks(&mut store, &listing.entries).unwrap();

    assert_eq!(store.len(), 2);
    for (cid, entry) in cids.iter().zip(&entries) {
        assert_eq!(cid.to_string(), entry.identifier);
        assert_eq!(store.get(cid), Some(entry.bytes.as_slice()));
    }
}

#[test]
fn test_load_blocks_is_idempotent() {
    let entries = vec![raw_entry(b"penguin"), raw_entry(b"knife")];

    let mut once = BlockStore::new();
    load_blocks(&mut once, &entries).unwrap();

    let mut twice = BlockStore::new();
    load_blocks(&mut twice, &entries).unwrap();
    load_blocks(&mut twice, &entries).unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.len(), 2);
}

#[test]
fn test_digest_mismatch_rejected_and_store_untouched() {
    let good = raw_entry(b"good block");
    let forged = BlockEntry::new(raw_entry(b"original").identifier, b"tampered".to_vec());

    let mut store = BlockStore::new();
    let err = load_blocks(&mut store, &[good, forged]).unwrap_err();
    assert!(matches!(err, StoreError::DigestMismatch { .. }), "{err:?}");
    assert!(store.is_empty(), "no entry should be inserted on failure");
}

#[test]
fn test_unchecked_store_overwrites_silently() {
    let id = raw_entry(b"original").identifier;
    let mut store = BlockStore::unchecked();
    load_blocks(&mut store, &[BlockEntry::new(id.clone(), b"one".to_vec())]).unwrap();
    load_blocks(&mut store, &[BlockEntry::new(id.clone(), b"two".to_vec())]).unwrap();

    let cid = parse_cid(&id).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&cid), Some(&b"two"[..]));
}

#[test]
fn test_invalid_identifier_is_store_error() {
    let mut store = BlockStore::unchecked();
    let err = load_blocks(&mut store, &[BlockEntry::new("not-a-cid", vec![1])]).unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));
}

#[test]
fn test_verify_supported_hashes() {
    let data = b"wartime penguins";
    for code in [SHA2_256, KECCAK_256, BLAKE3, IDENTITY] {
        let cid = cid_for(CODEC_RAW, code, data).unwrap();
        verify_block(&cid, data).unwrap();
        assert!(verify_block(&cid, b"other").is_err());
    }
    assert!(matches!(hash_with(0x13, data), Err(StoreError::UnsupportedHash(0x13))));
}

#[test]
fn test_ipfs_prefix_is_accepted() {
    let entry = raw_entry(b"x");
    let cid = parse_cid(&format!("ipfs://{}", entry.identifier)).unwrap();
    assert_eq!(cid.to_string(), entry.identifier);
}

#[test]
fn test_dag_cbor_links() {
    let leaf = cid_for(CODEC_RAW, SHA2_256, b"leaf").unwrap();
    let other = cid_for(CODEC_RAW, SHA2_256, b"other").unwrap();
    let node = ciborium::value::Value::Map(vec![
        (ciborium::value::Value::Text("a".into()), cbor_link(&leaf)),
        (
            ciborium::value::Value::Text("list".into()),
            ciborium::value::Value::Array(vec![cbor_link(&other)]),
        ),
    ]);
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&node, &mut bytes).unwrap();
    let cid = cid_for(CODEC_DAG_CBOR, SHA2_256, &bytes).unwrap();

    assert_eq!(links(&cid, &bytes).unwrap(), vec![leaf, other]);
    assert!(links(&leaf, b"leaf").unwrap().is_empty());
}

#[test]
fn test_identity_cid_rejects_extended_bytes() {
    let cid = cid_for(CODEC_RAW, IDENTITY, b"abc").unwrap();
    assert!(matches!(
        verify_block(&cid, b"abcTAMPERED"),
        Err(StoreError::DigestMismatch { .. })
    ));

    let mut store = BlockStore::new();
    let err = load_blocks(&mut store, &[BlockEntry::new(cid.to_string(), b"abcTAMPERED".to_vec())])
        .unwrap_err();
    assert!(matches!(err, StoreError::DigestMismatch { .. }), "{err:?}");
    assert!(store.is_empty());
}

#[test]
fn test_truncated_multihash_compares_prefix() {
    let data = b"truncated digest";
    let full = hash_with(SHA2_256, data).unwrap();
    let mh = cid::multihash::Multihash::<64>::wrap(SHA2_256, &full[..20]).unwrap();
    let cid = cid::Cid::new_v1(CODEC_RAW, mh);
    verify_block(&cid, data).unwrap();
    assert!(verify_block(&cid, b"something else").is_err());
}
