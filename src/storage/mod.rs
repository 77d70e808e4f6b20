// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod block_store;
pub mod links;

pub use block_store::{load_blocks, BlockStore};
