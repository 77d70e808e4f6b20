// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use ethers::types::Address;
use ethers::utils::to_checksum;
use penguin_mint::input::parse_seed;
use penguin_mint::types::id::decode_hex32;
use penguin_node::config::WalletConfig;
use penguin_node::wallet::{MintReceipt, Wallet};

/// Sends `requestmint(seed)` to the mint contract.
pub async fn run(cfg: &WalletConfig, seed: &str) -> anyhow::Result<MintReceipt> {
    let seed = parse_seed(seed)?;
    let wallet = Wallet::connect(cfg).await?;

    match wallet.request_mint(seed).await {
        Ok(receipt) => {
            println!("RequestMint sent, tx hash: {:?}", receipt.tx_hash);
            match receipt.block_number {
                Some(block) => println!("RequestMint confirmed in block {block}"),
                None => println!("RequestMint confirmed"),
            }
            Ok(receipt)
        }
        Err(e) => {
            println!("Error requesting mint: {e}");
            Err(e.into())
        }
    }
}

/// Looks up who a pending mint digest belongs to.
pub async fn pending(cfg: &WalletConfig, digest: &str) -> anyhow::Result<Address> {
    let digest = decode_hex32(digest)?;
    let wallet = Wallet::connect(cfg).await?;
    let owner = wallet.mint_in_progress(digest).await?;
    if owner.is_zero() {
        println!("No mint in progress for 0x{}", hex::encode(digest));
    } else {
        println!("Mint in progress for {}", to_checksum(&owner, None));
    }
    Ok(owner)
}
