// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Issue, decode, resolve, load. One run per compute action.

use std::sync::Arc;
use std::time::Instant;

use cid::Cid;
use ethers::types::{Address, U256};
use penguin_mint::input::TaskRequest;
use penguin_mint::notice::{decode_notice_payload, extract_notice_call, unwrap_notice_call};
use penguin_mint::preimage::{decode_preimage, PreimageListing};
use penguin_mint::storage::{load_blocks, BlockStore};
use penguin_mint::types::id::parse_cid;
use penguin_mint::unixfs::{ls, view_nft, DirEntry, NftView};
use penguin_mint::{archive, DecodeError, NoticePayload};
use serde_json::Value;

use crate::config::{BlockSource, PipelineConfig, PostLoad};
use crate::errors::{PipelineError, WalletError};
use crate::network::Relay;

/// Everything one user session accumulates.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub wallet: Option<Address>,
    pub seed: Option<U256>,
    /// Status line of the last wallet action.
    pub status: String,
    /// Transcript of the last compute run, or its error.
    pub output: String,
    pub store: BlockStore,
    /// Label of the last decoded notice.
    pub nft: Option<String>,
    pub archive: Option<Vec<u8>>,
}

impl Session {
    pub fn new(verify_digests: bool) -> Self {
        Self {
            store: BlockStore::with_verification(verify_digests),
            ..Default::default()
        }
    }

    pub fn connect(&mut self, address: Address) {
        self.status = format!("Connected: {}", ethers::utils::to_checksum(&address, None));
        self.wallet = Some(address);
    }

    /// Replaces the status entirely, as a failed connection does.
    pub fn connect_failed(&mut self, err: &WalletError) {
        tracing::error!("Error connecting wallet: {}", err);
        self.wallet = None;
        self.status = "Error connecting wallet".to_string();
    }
}

/// Human-readable log of one compute run.
#[derive(Debug, Default)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Starts a new paragraph.
    pub fn section(&mut self, line: impl AsRef<str>) {
        if !self.text.is_empty() {
            self.text.push_str("\n\n");
        }
        self.text.push_str(line.as_ref());
    }

    pub fn line(&mut self, line: impl AsRef<str>) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line.as_ref());
    }
}

/// Outcome of one compute run.
#[derive(Debug, Clone, Default)]
pub struct ComputeReport {
    /// `None` when the response carried no notice.
    pub notice: Option<NoticePayload>,
    pub stored: Vec<Cid>,
    pub diagnostic: Option<String>,
    pub archive_len: Option<usize>,
    pub listing: Vec<DirEntry>,
}

impl ComputeReport {
    pub fn is_absent(&self) -> bool {
        self.notice.is_none()
    }
}

pub struct Pipeline {
    relay: Arc<dyn Relay>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(relay: Arc<dyn Relay>, config: PipelineConfig) -> Self {
        Self { relay, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn task_for(&self, wallet: Address, seed: U256) -> TaskRequest {
        TaskRequest::for_mint(self.config.machine_hash, self.config.target_address, wallet, seed)
    }

    /// Runs a compute action and records its transcript in the session.
    ///
    /// Errors end up as an `Error: ..` line in `session.output`; the report
    /// is only returned on success.
    pub async fn compute(&self, session: &mut Session) -> Option<ComputeReport> {
        let started = Instant::now();
        let mut transcript = Transcript::default();
        let result = self.run(session, &mut transcript).await;
        metrics::histogram!("penguin_compute_duration_seconds", started.elapsed().as_secs_f64());

        match result {
            Ok(report) => {
                session.output = transcript.text;
                Some(report)
            }
            Err(e) => {
                tracing::error!("Compute failed: {:?}", e);
                transcript.section(format!("Error: {e}"));
                session.output = transcript.text;
                None
            }
        }
    }

    /// Same as [`compute`](Self::compute) but hands the error back.
    pub async fn try_compute(&self, session: &mut Session) -> Result<ComputeReport, PipelineError> {
        let mut transcript = Transcript::default();
        let report = self.run(session, &mut transcript).await?;
        session.output = transcript.text;
        Ok(report)
    }

    async fn run(
        &self,
        session: &mut Session,
        out: &mut Transcript,
    ) -> Result<ComputeReport, PipelineError> {
        let wallet = session.wallet.ok_or(WalletError::NotConnected)?;
        let seed = session.seed.ok_or(PipelineError::MissingSeed)?;

        out.line("Compute nft request...");
        let task = self.task_for(wallet, seed);
        tracing::debug!("Encoded input: {}", task.input_hex());
        let response = self.relay.issue_task(&task).await?;
        out.section(serde_json::to_string_pretty(&response).unwrap_or_default());

        let mut report = ComputeReport::default();
        let Some(notice) = self.decode_notice(&response, out)? else {
            tracing::info!("Response carried no notice; skipping preimage resolution");
            return Ok(report);
        };
        session.nft = Some(notice.label.clone());

        let listing = self.resolve_preimage(&notice.digest, out).await?;
        if let Some(diagnostic) = &listing.diagnostic {
            out.line(format!("{diagnostic}."));
        }

        let stored = load_blocks(&mut session.store, &listing.entries)?;
        metrics::counter!("penguin_blocks_stored_total", stored.len() as u64);
        for (index, cid) in stored.iter().enumerate() {
            out.line(format!("Stored block {index} with CID: {cid}"));
        }

        match self.config.post_load {
            PostLoad::Export => {
                let car = archive::export_archive(&notice.label, &session.store)?;
                out.section(format!("Notice CAR archive: {} bytes", car.len()));
                report.archive_len = Some(car.len());
                session.archive = Some(car);
            }
            PostLoad::List => {
                let root = parse_cid(&notice.label)?;
                report.listing = ls(&session.store, &root)?;
                for entry in &report.listing {
                    out.line(format!("{}  {}  {}", entry.cid, entry.size, entry.name));
                }
            }
            PostLoad::None => {}
        }

        report.notice = Some(notice);
        report.stored = stored;
        report.diagnostic = listing.diagnostic;
        Ok(report)
    }

    /// Pulls the notice out of a service response, transcribing each layer.
    pub fn decode_notice(
        &self,
        response: &Value,
        out: &mut Transcript,
    ) -> Result<Option<NoticePayload>, DecodeError> {
        let Some(call) = extract_notice_call(response)? else {
            return Ok(None);
        };
        out.section(format!("Full Notice Buffer (hex): {}", hex::encode(&call)));

        let inner = unwrap_notice_call(&call, self.config.notice_decoding)?;
        out.section(format!("Inner Payload (hex): 0x{}", hex::encode(&inner)));
        let notice = decode_notice_payload(&inner)?;
        out.section("Decoded Notice Payload:");
        out.line(format!("  String: {}", notice.label));
        out.line(format!("  Bytes32: {}", notice.digest_hex()));
        Ok(Some(notice))
    }

    /// Fetches and decodes the preimage listing for `digest`.
    ///
    /// Under [`BlockSource::Digest`] each entry holds a block digest, and the
    /// block itself is fetched before it is returned.
    pub async fn resolve_preimage(
        &self,
        digest: &[u8; 32],
        out: &mut Transcript,
    ) -> Result<PreimageListing, PipelineError> {
        let digest_hex = hex::encode(digest);
        let bytes = self.relay.fetch_preimage(self.config.hash_type, &digest_hex).await?;
        out.section(format!("Preimage Buffer (hex): {}", hex::encode(&bytes)));

        let mut listing = decode_preimage(&bytes)?;
        if self.config.block_source == BlockSource::Digest {
            for (index, entry) in listing.entries.iter_mut().enumerate() {
                if entry.bytes.len() != 32 {
                    return Err(DecodeError::PreimageEntry {
                        index,
                        reason: format!("expected a 32-byte digest, got {} bytes", entry.bytes.len()),
                    }
                    .into());
                }
                let block_hex = hex::encode(&entry.bytes);
                entry.bytes = self.relay.fetch_preimage(self.config.hash_type, &block_hex).await?;
            }
        }
        Ok(listing)
    }

    /// Reads metadata and image of the last computed NFT.
    pub fn view(&self, session: &Session) -> Result<NftView, PipelineError> {
        let label = session.nft.as_deref().ok_or(PipelineError::NoNft)?;
        Ok(view_nft(&session.store, label)?)
    }
}
