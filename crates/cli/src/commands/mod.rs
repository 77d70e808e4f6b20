// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod compute;
pub mod connect;
pub mod inspect;
pub mod mint;
pub mod view;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use penguin_mint::types::id::{CODEC_DAG_CBOR, CODEC_DAG_PB, CODEC_RAW};
use penguin_mint::unixfs::NftView;

pub(crate) fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub(crate) fn codec_name(codec: u64) -> String {
    match codec {
        CODEC_RAW => "raw".to_string(),
        CODEC_DAG_PB => "dag-pb".to_string(),
        CODEC_DAG_CBOR => "dag-cbor".to_string(),
        other => format!("0x{other:x}"),
    }
}

pub(crate) fn print_view(view: &NftView) {
    let mut t = table(vec!["Field", "Value"]);
    t.add_row(vec!["Metadata", &view.metadata_cid.to_string()]);
    t.add_row(vec!["Name", view.metadata.name.as_deref().unwrap_or("-")]);
    t.add_row(vec!["Description", view.metadata.description.as_deref().unwrap_or("-")]);
    t.add_row(vec!["Image", &view.image_cid.to_string()]);
    t.add_row(vec![
        "Image type",
        &format!("{} ({} bytes)", view.image_mime(), view.image.len()),
    ]);
    for (key, value) in &view.metadata.extra {
        t.add_row(vec![key.as_str(), &value.to_string()]);
    }
    println!("{t}\n");
}
