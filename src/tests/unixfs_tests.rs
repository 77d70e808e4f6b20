use crate::digest::{cid_for, SHA2_256};
use crate::error::{DecodeError, StoreError};
use crate::fixtures::{nft_fixture, IMAGE_FILE};
use crate::storage::{load_blocks, BlockStore};
use crate::types::id::{CODEC_DAG_PB, CODEC_RAW};
use crate::unixfs::pb::{DataType, PbLink, PbNode, UnixFsData};
use crate::unixfs::{
    cat, encode_chunked_file, encode_directory, encode_file, ls, resolve_path, sniff_image_type,
    view_nft, DirEntry, METADATA_FILE,
};
use prost::Message;
use ethers::types::U256;

#[test]
fn test_view_nft_reads_metadata_and_image() {
    let fixture = nft_fixture(U256::from(1234u64)).unwrap();
    let mut store = BlockStore::new();
    load_blocks(&mut store, &fixture.entries).unwrap();

    let view = view_nft(&store, &format!("ipfs://{}", fixture.notice.label)).unwrap();
    assert_eq!(view.metadata, fixture.metadata);
    assert_eq!(view.image, fixture.image);
    assert_eq!(view.image_mime(), "image/gif");
}

#[test]
fn test_ls_lists_directory() {
    let fixture = nft_fixture(U256::from(5u64)).unwrap();
    let mut store = BlockStore::new();
    load_blocks(&mut store, &fixture.entries).unwrap();

    let names: Vec<String> = ls(&store, &fixture.root).unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec![IMAGE_FILE.to_string(), METADATA_FILE.to_string()]);

    let image = resolve_path(&store, &fixture.root, IMAGE_FILE).unwrap();
    assert!(matches!(ls(&store, &image), Err(StoreError::Decode(DecodeError::UnixFs { .. }))));
    assert!(matches!(
        resolve_path(&store, &fixture.root, "missing.json"),
        Err(StoreError::PathNotFound { .. })
    ));
}

#[test]
fn test_cat_single_block_file_and_raw_leaf() {
    let node = encode_file(b"hello penguins");
    let file = cid_for(CODEC_DAG_PB, SHA2_256, &node).unwrap();
    let leaf = cid_for(CODEC_RAW, SHA2_256, b"raw").unwrap();

    let mut store = BlockStore::new();
    store.put(file, node).unwrap();
    store.put(leaf, b"raw".to_vec()).unwrap();

    assert_eq!(cat(&store, &file).unwrap(), b"hello penguins");
    assert_eq!(cat(&store, &leaf).unwrap(), b"raw");
}

#[test]
fn test_view_without_blocks_is_not_found() {
    let fixture = nft_fixture(U256::from(6u64)).unwrap();
    let store = BlockStore::new();
    assert!(matches!(view_nft(&store, &fixture.notice.label), Err(StoreError::NotFound(_))));
}

#[test]
fn test_sniff_image_type() {
    assert_eq!(sniff_image_type(b"GIF89a..."), "image/gif");
    assert_eq!(sniff_image_type(&[0x89, b'P', b'N', b'G', 0x0d]), "image/png");
    assert_eq!(sniff_image_type(b"??"), "application/octet-stream");
}

#[test]
fn test_cat_self_linked_file_is_rejected() {
    let cid = cid_for(CODEC_DAG_PB, SHA2_256, b"placeholder").unwrap();
    let mut store = BlockStore::unchecked();
    store.put(cid, encode_chunked_file(&[(cid, 1)])).unwrap();

    assert!(matches!(cat(&store, &cid), Err(StoreError::Decode(DecodeError::UnixFs { .. }))));
}

#[test]
fn test_cat_repeated_leaf_is_not_a_cycle() {
    let leaf = cid_for(CODEC_RAW, SHA2_256, b"ab").unwrap();
    let node = encode_chunked_file(&[(leaf, 2), (leaf, 2)]);
    let file = cid_for(CODEC_DAG_PB, SHA2_256, &node).unwrap();

    let mut store = BlockStore::new();
    store.put(leaf, b"ab".to_vec()).unwrap();
    store.put(file, node).unwrap();

    assert_eq!(cat(&store, &file).unwrap(), b"abab");
}

#[test]
fn test_sharded_directory_is_rejected() {
    let child = cid_for(CODEC_RAW, SHA2_256, b"child").unwrap();
    let data = UnixFsData {
        data_type: Some(DataType::HamtShard.code()),
        ..Default::default()
    };
    let node = PbNode {
        links: vec![PbLink {
            hash: Some(child.to_bytes()),
            name: Some("00child".to_string()),
            tsize: Some(5),
        }],
        data: Some(data.encode_to_vec()),
    }
    .encode_to_vec();
    let shard = cid_for(CODEC_DAG_PB, SHA2_256, &node).unwrap();

    let mut store = BlockStore::new();
    store.put(shard, node).unwrap();
    store.put(child, b"child".to_vec()).unwrap();

    assert!(matches!(ls(&store, &shard), Err(StoreError::Decode(DecodeError::UnixFs { .. }))));
    assert!(matches!(
        resolve_path(&store, &shard, "child"),
        Err(StoreError::Decode(DecodeError::UnixFs { .. }))
    ));
}

#[test]
fn test_directory_encodes_links_before_data() {
    let child = cid_for(CODEC_RAW, SHA2_256, b"child").unwrap();
    let bytes = encode_directory(&[DirEntry {
        name: "child".to_string(),
        cid: child,
        size: 5,
    }]);
    // field 2 (Links), length-delimited
    assert_eq!(bytes[0], 0x12);
    assert_eq!(PbNode::decode(bytes.as_slice()).unwrap().links.len(), 1);
}
