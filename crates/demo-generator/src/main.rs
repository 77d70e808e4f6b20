// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use demo_generator::{spawn, MockCoprocessor, MockOptions};
use penguin_mint::archive::export_cid;
use penguin_mint::fixtures::nft_fixture;
use penguin_mint::input::parse_seed;
use penguin_mint::storage::{load_blocks, BlockStore};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "demo-generator")]
#[command(about = "Mock coprocessor and fixture archives for local runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the mock coprocessor.
    Serve {
        #[arg(default_value = "127.0.0.1:3002")]
        addr: SocketAddr,

        /// Answer with digest listings instead of inline blocks
        #[arg(long)]
        digest_listing: bool,
    },
    /// Write the fixture NFT for a seed as a CAR file.
    Car { seed: String, out: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "demo_generator=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Commands::Serve {
            addr,
            digest_listing,
        } => serve(addr, digest_listing).await,
        Commands::Car { seed, out } => write_car(&seed, &out),
    }
}

async fn serve(addr: SocketAddr, digest_listing: bool) -> Result<()> {
    let options = MockOptions {
        digest_listing,
        ..Default::default()
    };
    let bound = spawn(Arc::new(MockCoprocessor::new(options)), addr).await?;
    println!("Mock coprocessor listening on http://{bound}");
    println!("Point the proxy at it with PENGUIN_UPSTREAM_URL=http://{bound}");
    tokio::signal::ctrl_c().await?;
    Ok(())
}

fn write_car(seed: &str, out: &Path) -> Result<()> {
    let fixture = nft_fixture(parse_seed(seed)?)?;

    let mut store = BlockStore::new();
    load_blocks(&mut store, &fixture.entries)?;
    let car = export_cid(&fixture.root, &store)?;
    std::fs::write(out, &car).with_context(|| format!("writing {}", out.display()))?;

    println!("Root:   {}", fixture.root);
    println!("Blocks: {}", fixture.entries.len());
    println!("Wrote {} bytes to {}", car.len(), out.display());
    Ok(())
}
