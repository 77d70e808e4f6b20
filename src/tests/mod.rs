#[cfg(test)]
// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod notice_tests;
pub mod storage_tests;
pub mod unixfs_tests;
