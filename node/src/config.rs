// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::str::FromStr;

use ethers::types::Address;
use penguin_mint::notice::NoticeDecoding;
use penguin_mint::types::id::decode_hex32;
use thiserror::Error;

pub const DEFAULT_MACHINE_HASH: &str =
    "4f9e81934a1096047822d363dc5c5c05348fc2ed19cc54e0814eb37612d52018";
pub const DEFAULT_TARGET_ADDRESS: &str = "0xA44151489861Fe9e3055d95adC98FbD462B948e7";
pub const DEFAULT_MINT_CONTRACT: &str = "0x680bBA4E54f62caafC906B9382C150603a7EF226";
pub const DEFAULT_UPSTREAM_URL: &str = "https://cartesi-coprocessor-solver-prod.fly.dev";
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3001";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
/// Preimage hash type for keccak256 digests.
pub const DEFAULT_HASH_TYPE: u8 = 2;

#[derive(Error, Debug)]
#[error("Invalid value `{value}` for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// How the relay sends the task input upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputEncoding {
    /// `{"input": "0x.."}` as JSON.
    #[default]
    Json,
    /// Raw bytes as `application/octet-stream`.
    Binary,
}

impl FromStr for InputEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "binary" | "octet-stream" => Ok(Self::Binary),
            other => Err(format!("unknown input encoding `{other}`")),
        }
    }
}

/// What the second field of each preimage entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSource {
    /// The block bytes themselves.
    #[default]
    Inline,
    /// The keccak256 of the block, fetched again through the relay.
    Digest,
}

impl FromStr for BlockSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "digest" => Ok(Self::Digest),
            other => Err(format!("unknown block source `{other}`")),
        }
    }
}

/// Step run once the blocks are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostLoad {
    #[default]
    Export,
    List,
    None,
}

impl FromStr for PostLoad {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "export" => Ok(Self::Export),
            "list" | "ls" => Ok(Self::List),
            "none" => Ok(Self::None),
            other => Err(format!("unknown post-load step `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub upstream_url: String,
    pub input_encoding: InputEncoding,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".parse().unwrap(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            input_encoding: InputEncoding::default(),
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `PENGUIN_BIND_ADDR`, `PENGUIN_UPSTREAM_URL`
    /// and `PENGUIN_INPUT_ENCODING`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(addr) = env_parsed("PENGUIN_BIND_ADDR")? {
            cfg.bind_addr = addr;
        }
        if let Some(url) = env_var("PENGUIN_UPSTREAM_URL") {
            cfg.upstream_url = url;
        }
        if let Some(encoding) = env_parsed("PENGUIN_INPUT_ENCODING")? {
            cfg.input_encoding = encoding;
        }
        Ok(cfg)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub proxy_url: String,
    pub machine_hash: [u8; 32],
    pub target_address: Address,
    pub hash_type: u8,
    pub notice_decoding: NoticeDecoding,
    pub block_source: BlockSource,
    pub post_load: PostLoad,
    pub verify_digests: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            machine_hash: decode_hex32(DEFAULT_MACHINE_HASH).unwrap(),
            target_address: DEFAULT_TARGET_ADDRESS.parse().unwrap(),
            hash_type: DEFAULT_HASH_TYPE,
            notice_decoding: NoticeDecoding::default(),
            block_source: BlockSource::default(),
            post_load: PostLoad::default(),
            verify_digests: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(url) = env_var("PENGUIN_PROXY_URL") {
            cfg.proxy_url = url;
        }
        if let Some(hash) = env_var("PENGUIN_MACHINE_HASH") {
            cfg.machine_hash = decode_hex32(&hash).map_err(|e| ConfigError {
                var: "PENGUIN_MACHINE_HASH",
                value: hash.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(address) = env_parsed("PENGUIN_TARGET_ADDRESS")? {
            cfg.target_address = address;
        }
        if let Some(hash_type) = env_parsed("PENGUIN_HASH_TYPE")? {
            cfg.hash_type = hash_type;
        }
        if let Some(mode) = env_parsed("PENGUIN_NOTICE_DECODING")? {
            cfg.notice_decoding = mode;
        }
        if let Some(source) = env_parsed("PENGUIN_BLOCK_SOURCE")? {
            cfg.block_source = source;
        }
        if let Some(step) = env_parsed("PENGUIN_POST_LOAD")? {
            cfg.post_load = step;
        }
        if let Some(verify) = env_parsed("PENGUIN_VERIFY_DIGESTS")? {
            cfg.verify_digests = verify;
        }
        Ok(cfg)
    }
}

/// Local signer standing in for a browser wallet.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub private_key: Option<String>,
    pub rpc_url: String,
    pub contract: Address,
    /// Queried from the provider when unset.
    pub chain_id: Option<u64>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract: DEFAULT_MINT_CONTRACT.parse().unwrap(),
            chain_id: None,
        }
    }
}

impl WalletConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.private_key = env_var("PENGUIN_PRIVATE_KEY");
        if let Some(url) = env_var("PENGUIN_RPC_URL") {
            cfg.rpc_url = url;
        }
        if let Some(contract) = env_parsed("PENGUIN_MINT_CONTRACT")? {
            cfg.contract = contract;
        }
        cfg.chain_id = env_parsed("PENGUIN_CHAIN_ID")?;
        Ok(cfg)
    }
}

fn env_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(var)
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
