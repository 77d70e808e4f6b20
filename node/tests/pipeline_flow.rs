use demo_generator::{spawn_local, MockOptions};
use ethers::types::{Address, U256};
use penguin_mint::archive::read_archive;
use penguin_mint::fixtures::{nft_fixture, IMAGE_FILE};
use penguin_mint::notice::NoticeDecoding;
use penguin_mint::unixfs::METADATA_FILE;
use penguin_node::config::{BlockSource, InputEncoding, PipelineConfig, PostLoad};
use penguin_node::errors::{PipelineError, RelayError, WalletError};
use penguin_node::network::UpstreamClient;
use penguin_node::pipeline::{Pipeline, Session};
use std::sync::Arc;

fn connected_session(seed: u64) -> Session {
    let mut session = Session::new(true);
    session.connect(Address::repeat_byte(0x11));
    session.seed = Some(U256::from(seed));
    session
}

async fn pipeline_with(options: MockOptions, config: PipelineConfig) -> Pipeline {
    let (_mock, upstream) = spawn_local(options).await.unwrap();
    Pipeline::new(Arc::new(UpstreamClient::new(upstream, InputEncoding::Json)), config)
}

#[tokio::test]
async fn test_compute_exports_archive() {
    let pipeline = pipeline_with(MockOptions::default(), PipelineConfig::default()).await;
    let mut session = connected_session(42);

    let report = pipeline.compute(&mut session).await.expect("compute failed");
    let fixture = nft_fixture(U256::from(42u64)).unwrap();

    assert_eq!(report.notice.as_ref().unwrap(), &fixture.notice);
    assert_eq!(report.stored.len(), fixture.entries.len());
    assert_eq!(session.store.len(), fixture.entries.len());
    assert_eq!(session.nft.as_deref(), Some(fixture.notice.label.as_str()));

    let car = session.archive.as_ref().unwrap();
    assert_eq!(report.archive_len, Some(car.len()));
    assert_eq!(read_archive(car).unwrap().roots, vec![fixture.root]);

    assert!(session.output.contains("Full Notice Buffer (hex): "));
    assert!(session.output.contains(&format!("  String: {}", fixture.notice.label)));
    assert!(session.output.contains(&format!("Stored block 0 with CID: {}", fixture.entries[0].identifier)));

    let view = pipeline.view(&session).unwrap();
    assert_eq!(view.image, fixture.image);
    assert_eq!(view.metadata, fixture.metadata);
}

#[tokio::test]
async fn test_compute_digest_listing() {
    let config = PipelineConfig {
        block_source: BlockSource::Digest,
        post_load: PostLoad::List,
        ..Default::default()
    };
    let options = MockOptions {
        digest_listing: true,
        ..Default::default()
    };
    let pipeline = pipeline_with(options, config).await;
    let mut session = connected_session(7);

    let report = pipeline.try_compute(&mut session).await.unwrap();
    let fixture = nft_fixture(U256::from(7u64)).unwrap();
    assert_eq!(session.store.len(), fixture.entries.len());

    let names: Vec<&str> = report.listing.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec![IMAGE_FILE, METADATA_FILE]);
    assert!(session.archive.is_none());
}

#[tokio::test]
async fn test_inline_source_rejects_digest_listing() {
    // Digests are not the blocks their CIDs name.
    let options = MockOptions {
        digest_listing: true,
        ..Default::default()
    };
    let pipeline = pipeline_with(options, PipelineConfig::default()).await;
    let mut session = connected_session(8);

    let err = pipeline.try_compute(&mut session).await.unwrap_err();
    assert!(matches!(err, PipelineError::Store(_)), "{err:?}");
    assert!(session.store.is_empty());
}

#[tokio::test]
async fn test_absent_notice_stops_after_issue() {
    let options = MockOptions {
        with_notice: false,
        ..Default::default()
    };
    let pipeline = pipeline_with(options, PipelineConfig::default()).await;
    let mut session = connected_session(1);

    let report = pipeline.compute(&mut session).await.unwrap();
    assert!(report.is_absent());
    assert!(session.store.is_empty());
    assert!(session.nft.is_none());
    assert!(!session.output.contains("Preimage Buffer"));
}

#[tokio::test]
async fn test_zero_selector_needs_strip_mode() {
    let options = MockOptions {
        selector: [0; 4],
        ..Default::default()
    };
    let strict = pipeline_with(options.clone(), PipelineConfig::default()).await;
    let mut session = connected_session(2);
    assert!(strict.compute(&mut session).await.is_none());
    assert!(session.output.contains("Error: Notice selector mismatch"));

    let lenient = pipeline_with(
        options,
        PipelineConfig {
            notice_decoding: NoticeDecoding::StripSelector,
            ..Default::default()
        },
    )
    .await;
    let mut session = connected_session(2);
    let report = lenient.compute(&mut session).await.unwrap();
    assert!(!report.is_absent());
}

#[tokio::test]
async fn test_busy_upstream_message_reaches_transcript() {
    let options = MockOptions {
        busy: Some("machine busy".to_string()),
        ..Default::default()
    };
    let pipeline = pipeline_with(options, PipelineConfig::default()).await;
    let mut session = connected_session(3);

    let err = pipeline.try_compute(&mut session).await.unwrap_err();
    match err {
        PipelineError::Relay(RelayError::Upstream { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "machine busy");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    pipeline.compute(&mut session).await;
    assert!(session.output.ends_with("Error: machine busy"));
}

#[tokio::test]
async fn test_compute_requires_wallet_and_seed() {
    let pipeline = pipeline_with(MockOptions::default(), PipelineConfig::default()).await;

    let mut session = Session::new(true);
    let err = pipeline.try_compute(&mut session).await.unwrap_err();
    assert!(matches!(err, PipelineError::Wallet(WalletError::NotConnected)));

    session.connect(Address::repeat_byte(0x22));
    let err = pipeline.try_compute(&mut session).await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingSeed));

    assert!(matches!(pipeline.view(&session), Err(PipelineError::NoNft)));
}

#[tokio::test]
async fn test_repeat_compute_is_idempotent() {
    let pipeline = pipeline_with(MockOptions::default(), PipelineConfig::default()).await;
    let mut session = connected_session(9);

    pipeline.compute(&mut session).await.unwrap();
    let before = session.store.clone();
    pipeline.compute(&mut session).await.unwrap();
    assert_eq!(session.store, before);
}
