// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Task inputs and contract call data.

use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, U256};

use crate::error::{DecodeError, DecodeResult};

pub const REQUEST_MINT_SIGNATURE: &str = "requestmint(uint256)";
pub const MINTS_IN_PROGRESS_SIGNATURE: &str = "mintsInProgress(bytes32)";

/// One task submission to the coprocessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub machine_hash: [u8; 32],
    pub target_address: Address,
    pub input: Vec<u8>,
}

impl TaskRequest {
    pub fn new(machine_hash: [u8; 32], target_address: Address, input: Vec<u8>) -> Self {
        Self {
            machine_hash,
            target_address,
            input,
        }
    }

    /// Task whose input is `abi.encode(wallet, seed)`.
    pub fn for_mint(machine_hash: [u8; 32], target_address: Address, wallet: Address, seed: U256) -> Self {
        Self::new(machine_hash, target_address, encode_mint_input(wallet, seed))
    }

    /// Machine hash as the path segment the coprocessor expects (no `0x`).
    pub fn machine_hash_hex(&self) -> String {
        hex::encode(self.machine_hash)
    }

    /// EIP-55 checksummed target address.
    pub fn target_address_hex(&self) -> String {
        ethers::utils::to_checksum(&self.target_address, None)
    }

    pub fn input_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.input))
    }
}

pub fn encode_mint_input(wallet: Address, seed: U256) -> Vec<u8> {
    abi::encode(&[Token::Address(wallet), Token::Uint(seed)])
}

pub fn decode_mint_input(input: &[u8]) -> DecodeResult<(Address, U256)> {
    let tokens = abi::decode(&[ParamType::Address, ParamType::Uint(256)], input).map_err(|e| {
        DecodeError::Abi {
            what: "mint input",
            reason: e.to_string(),
            raw: hex::encode(input),
        }
    })?;
    match tokens.as_slice() {
        [Token::Address(wallet), Token::Uint(seed)] => Ok((*wallet, *seed)),
        _ => Err(DecodeError::Abi {
            what: "mint input",
            reason: "expected (address, uint256)".to_string(),
            raw: hex::encode(input),
        }),
    }
}

/// Parses a decimal uint256 seed.
pub fn parse_seed(text: &str) -> DecodeResult<U256> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Seed(text.to_string()));
    }
    U256::from_dec_str(trimmed).map_err(|_| DecodeError::Seed(text.to_string()))
}

pub fn parse_address(text: &str) -> DecodeResult<Address> {
    text.trim()
        .parse::<Address>()
        .map_err(|e| DecodeError::Hex(format!("{text}: {e}")))
}

/// Call data for `requestmint(uint256 seed)`.
pub fn request_mint_call(seed: U256) -> Vec<u8> {
    let mut call = ethers::utils::id(REQUEST_MINT_SIGNATURE).to_vec();
    call.extend(abi::encode(&[Token::Uint(seed)]));
    call
}

/// Call data for `mintsInProgress(bytes32)`.
pub fn mints_in_progress_call(digest: [u8; 32]) -> Vec<u8> {
    let mut call = ethers::utils::id(MINTS_IN_PROGRESS_SIGNATURE).to_vec();
    call.extend(abi::encode(&[Token::FixedBytes(digest.to_vec())]));
    call
}

pub fn decode_address_return(data: &[u8]) -> DecodeResult<Address> {
    match abi::decode(&[ParamType::Address], data).as_deref() {
        Ok([Token::Address(addr)]) => Ok(*addr),
        Ok(_) => Err(DecodeError::Abi {
            what: "address return",
            reason: "expected a single address".to_string(),
            raw: hex::encode(data),
        }),
        Err(e) => Err(DecodeError::Abi {
            what: "address return",
            reason: e.to_string(),
            raw: hex::encode(data),
        }),
    }
}
