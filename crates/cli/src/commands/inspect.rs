// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::Path;

use anyhow::Context;
use penguin_mint::archive::read_archive;
use penguin_mint::digest::verify_block;
use penguin_mint::storage::BlockStore;
use penguin_mint::unixfs::ls;

use super::{codec_name, table};

/// Prints the roots and blocks of a CAR archive.
pub fn run(car: &Path, list_root: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(car).with_context(|| format!("reading {}", car.display()))?;
    let archive = read_archive(&bytes)?;

    println!("\nArchive Report");
    println!("--------------");
    for root in &archive.roots {
        println!("Root: {root}");
    }

    let mut t = table(vec!["CID", "Codec", "Bytes", "Digest"]);
    for (cid, data) in &archive.blocks {
        let status = match verify_block(cid, data) {
            Ok(()) => "OK".to_string(),
            Err(e) => e.to_string(),
        };
        t.add_row(vec![
            cid.to_string(),
            codec_name(cid.codec()),
            data.len().to_string(),
            status,
        ]);
    }
    println!("{t}\n");

    if list_root {
        let mut store = BlockStore::unchecked();
        for (cid, data) in archive.blocks {
            store.put(cid, data)?;
        }
        for root in &archive.roots {
            let mut t = table(vec!["Name", "CID", "Size"]);
            for entry in ls(&store, root)? {
                t.add_row(vec![entry.name, entry.cid.to_string(), entry.size.to_string()]);
            }
            println!("{root}\n{t}\n");
        }
    }

    Ok(())
}
