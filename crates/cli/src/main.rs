// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Args, Parser, Subcommand};
use penguin_cli::commands::{compute, connect, inspect, mint, view};
use penguin_mint::notice::NoticeDecoding;
use penguin_node::config::{BlockSource, PipelineConfig, PostLoad, WalletConfig};
use penguin_node::telemetry::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "penguin")]
#[command(about = "Wartime Penguins - mint NFTs through the coprocessor and read them back", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WalletArgs {
    /// Hex private key of the minting wallet
    #[arg(long, env = "PENGUIN_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Ethereum JSON-RPC endpoint
    #[arg(long, env = "PENGUIN_RPC_URL")]
    rpc_url: Option<String>,

    /// Mint contract address
    #[arg(long, env = "PENGUIN_MINT_CONTRACT")]
    contract: Option<String>,

    #[arg(long, env = "PENGUIN_CHAIN_ID")]
    chain_id: Option<u64>,
}

impl WalletArgs {
    fn into_config(self) -> anyhow::Result<WalletConfig> {
        let mut cfg = WalletConfig::from_env()?;
        cfg.private_key = self.private_key.or(cfg.private_key);
        if let Some(url) = self.rpc_url {
            cfg.rpc_url = url;
        }
        if let Some(contract) = self.contract {
            cfg.contract = penguin_mint::input::parse_address(&contract)?;
        }
        cfg.chain_id = self.chain_id.or(cfg.chain_id);
        Ok(cfg)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Derive and show the wallet address.
    Connect {
        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// Issue a mint task, decode its notice and load the NFT blocks.
    Compute {
        /// Decimal seed for the penguin generator
        #[arg(long, short)]
        seed: String,

        /// Proxy relay base URL
        #[arg(long, env = "PENGUIN_PROXY_URL")]
        proxy_url: Option<String>,

        /// full | strip
        #[arg(long)]
        notice_decoding: Option<NoticeDecoding>,

        /// inline | digest
        #[arg(long)]
        block_source: Option<BlockSource>,

        /// export | list | none
        #[arg(long)]
        post_load: Option<PostLoad>,

        /// Store blocks without checking them against their CIDs
        #[arg(long)]
        no_verify: bool,

        /// Write the exported CAR archive here
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Show metadata and image once loaded
        #[arg(long)]
        view: bool,

        /// Write the image here (with --view)
        #[arg(long)]
        image_out: Option<PathBuf>,

        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// Show the NFT in a CAR archive.
    View {
        car: PathBuf,

        /// CID of the NFT directory (defaults to the archive root)
        #[arg(long)]
        label: Option<String>,

        #[arg(long)]
        image_out: Option<PathBuf>,
    },
    /// List the blocks of a CAR archive.
    Inspect {
        car: PathBuf,

        /// Also list the root directory
        #[arg(long)]
        ls: bool,
    },
    /// Call requestmint(seed) on the mint contract.
    Mint {
        #[arg(long, short)]
        seed: String,

        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// Read mintsInProgress(digest) from the mint contract.
    Pending {
        digest: String,

        #[command(flatten)]
        wallet: WalletArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("penguin_node=info,penguin_mint=info");
    let cli = Cli::parse();

    match cli.command {
        Commands::Connect { wallet } => connect::run(&wallet.into_config()?).map(|_| ()),
        Commands::Compute {
            seed,
            proxy_url,
            notice_decoding,
            block_source,
            post_load,
            no_verify,
            out,
            view,
            image_out,
            wallet,
        } => {
            let mut pipeline = PipelineConfig::from_env()?;
            if let Some(url) = proxy_url {
                pipeline.proxy_url = url;
            }
            if let Some(mode) = notice_decoding {
                pipeline.notice_decoding = mode;
            }
            if let Some(source) = block_source {
                pipeline.block_source = source;
            }
            if let Some(step) = post_load {
                pipeline.post_load = step;
            }
            if no_verify {
                pipeline.verify_digests = false;
            }
            compute::run(compute::ComputeOptions {
                pipeline,
                wallet: wallet.into_config()?,
                seed,
                car_out: out,
                view,
                image_out,
            })
            .await
            .map(|_| ())
        }
        Commands::View {
            car,
            label,
            image_out,
        } => view::run(&car, label.as_deref(), image_out.as_deref()).map(|_| ()),
        Commands::Inspect { car, ls } => inspect::run(&car, ls),
        Commands::Mint { seed, wallet } => mint::run(&wallet.into_config()?, &seed).await.map(|_| ()),
        Commands::Pending { digest, wallet } => {
            mint::pending(&wallet.into_config()?, &digest).await.map(|_| ())
        }
    }
}
