// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use penguin_mint::input::parse_seed;
use penguin_node::config::{PipelineConfig, WalletConfig};
use penguin_node::network::ProxyClient;
use penguin_node::pipeline::{Pipeline, Session};

use super::connect::connect_session;
use super::{codec_name, print_view, table};

pub struct ComputeOptions {
    pub pipeline: PipelineConfig,
    pub wallet: WalletConfig,
    pub seed: String,
    /// Where to write the exported CAR archive.
    pub car_out: Option<PathBuf>,
    /// Render metadata and image after loading.
    pub view: bool,
    pub image_out: Option<PathBuf>,
}

pub async fn run(opts: ComputeOptions) -> anyhow::Result<Session> {
    let mut session = Session::new(opts.pipeline.verify_digests);
    connect_session(&mut session, &opts.wallet)?;
    session.seed = Some(parse_seed(&opts.seed)?);

    let relay = ProxyClient::new(opts.pipeline.proxy_url.clone());
    let pipeline = Pipeline::new(Arc::new(relay), opts.pipeline);

    let report = pipeline.compute(&mut session).await;
    println!("{}\n", session.output);
    let Some(report) = report else {
        bail!("compute failed");
    };

    if report.is_absent() {
        println!("No notice in the task response yet.");
        return Ok(session);
    }

    let mut t = table(vec!["#", "CID", "Codec", "Bytes"]);
    for (index, cid) in report.stored.iter().enumerate() {
        let size = session.store.get(cid).map(<[u8]>::len).unwrap_or_default();
        t.add_row(vec![
            index.to_string(),
            cid.to_string(),
            codec_name(cid.codec()),
            size.to_string(),
        ]);
    }
    println!("{t}\n");

    if let (Some(path), Some(car)) = (&opts.car_out, &session.archive) {
        std::fs::write(path, car).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote CAR archive ({} bytes) to {}", car.len(), path.display());
    }

    if opts.view {
        let view = pipeline.view(&session)?;
        print_view(&view);
        if let Some(path) = &opts.image_out {
            std::fs::write(path, &view.image).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote image to {}", path.display());
        }
    }

    Ok(session)
}
