// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! penguin-mint: decoding and content core for coprocessor-minted NFTs.
//!
//! Turns a coprocessor task response into a notice, a notice into a block
//! listing, and a block listing into a content-addressed store that can be
//! read as UnixFS or exported as a CAR archive.

pub mod error;
pub mod types;
pub mod input;
pub mod notice;
pub mod preimage;
pub mod digest;
pub mod storage;
pub mod unixfs;
pub mod archive;
pub mod fixtures;

pub use error::{DecodeError, StoreError};
pub use types::{BlockEntry, NftMetadata, NoticePayload};

#[cfg(test)]
pub mod tests;
