// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod encode;
pub mod decode;

pub use decode::{import_archive, read_archive, CarArchive};
pub use encode::{export_archive, export_cid, CarWriter};
