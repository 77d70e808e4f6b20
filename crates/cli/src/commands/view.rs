// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::Path;

use anyhow::{bail, Context};
use penguin_mint::archive::import_archive;
use penguin_mint::storage::BlockStore;
use penguin_mint::unixfs::{view_nft, NftView};

use super::print_view;

/// Shows the NFT stored in a CAR archive. `label` defaults to its first root.
pub fn run(car: &Path, label: Option<&str>, image_out: Option<&Path>) -> anyhow::Result<NftView> {
    let bytes = std::fs::read(car).with_context(|| format!("reading {}", car.display()))?;
    let mut store = BlockStore::new();
    let roots = import_archive(&bytes, &mut store)?;

    let label = match (label, roots.first()) {
        (Some(label), _) => label.to_string(),
        (None, Some(root)) => root.to_string(),
        (None, None) => bail!("{} has no root and no label was given", car.display()),
    };

    let view = view_nft(&store, &label)?;
    print_view(&view);

    if let Some(path) = image_out {
        std::fs::write(path, &view.image).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote image to {}", path.display());
    }
    Ok(view)
}
