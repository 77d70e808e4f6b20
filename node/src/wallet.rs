// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Local signer for the mint contract.

use std::sync::Arc;

use ethers::prelude::{Http, LocalWallet, Middleware, Provider, Signer, SignerMiddleware};
use ethers::providers::ProviderExt;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, TransactionRequest, H256, U256, U64};
use penguin_mint::input::{decode_address_return, mints_in_progress_call, request_mint_call};

use crate::config::WalletConfig;
use crate::errors::WalletError;

/// Gas limit used when the provider cannot estimate `requestmint`.
pub const FALLBACK_GAS_LIMIT: u64 = 2_000_000;

/// Parses the configured private key.
pub fn signer(config: &WalletConfig) -> Result<LocalWallet, WalletError> {
    let key = config.private_key.as_deref().ok_or(WalletError::NotConfigured)?;
    key.trim()
        .trim_start_matches("0x")
        .parse::<LocalWallet>()
        .map_err(|e| WalletError::InvalidKey(e.to_string()))
}

/// Address of the configured key. Needs no provider.
pub fn connect(config: &WalletConfig) -> Result<Address, WalletError> {
    Ok(signer(config)?.address())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: H256,
    pub block_number: Option<U64>,
}

pub struct Wallet {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
    contract: Address,
}

impl Wallet {
    pub async fn connect(config: &WalletConfig) -> Result<Self, WalletError> {
        let signer = signer(config)?;
        // Local endpoints get a short receipt polling interval.
        let provider = Provider::<Http>::try_connect(&config.rpc_url)
            .await
            .map_err(|e| WalletError::Provider(e.to_string()))?;

        let chain_id = match config.chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .map_err(|e| WalletError::Provider(e.to_string()))?
                .as_u64(),
        };

        let client = SignerMiddleware::new(provider, signer.with_chain_id(chain_id));
        tracing::info!("Wallet {:?} connected on chain {}", client.address(), chain_id);
        Ok(Self {
            client: Arc::new(client),
            contract: config.contract,
        })
    }

    pub fn address(&self) -> Address {
        self.client.address()
    }

    /// Sends `requestmint(seed)` and waits for the receipt.
    pub async fn request_mint(&self, seed: U256) -> Result<MintReceipt, WalletError> {
        let mut tx: TypedTransaction = TransactionRequest::new()
            .from(self.address())
            .to(self.contract)
            .data(request_mint_call(seed))
            .into();

        let gas = match self.client.estimate_gas(&tx, None).await {
            Ok(gas) => {
                tracing::debug!("Estimated gas: {}", gas);
                gas
            }
            Err(e) => {
                tracing::warn!("Gas estimation failed, using {}: {}", FALLBACK_GAS_LIMIT, e);
                U256::from(FALLBACK_GAS_LIMIT)
            }
        };
        tx.set_gas(gas);

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| WalletError::Rejected(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        tracing::info!("RequestMint sent, tx hash: {:?}", tx_hash);

        let receipt = pending
            .await
            .map_err(|e| WalletError::Provider(e.to_string()))?
            .ok_or_else(|| WalletError::Dropped {
                tx: format!("{tx_hash:?}"),
            })?;

        if receipt.status == Some(U64::zero()) {
            return Err(WalletError::Reverted {
                tx: format!("{tx_hash:?}"),
            });
        }
        Ok(MintReceipt {
            tx_hash,
            block_number: receipt.block_number,
        })
    }

    /// Reads `mintsInProgress(digest)`: the address a pending mint belongs to.
    pub async fn mint_in_progress(&self, digest: [u8; 32]) -> Result<Address, WalletError> {
        let tx: TypedTransaction = TransactionRequest::new()
            .to(self.contract)
            .data(mints_in_progress_call(digest))
            .into();
        let ret = self
            .client
            .call(&tx, None)
            .await
            .map_err(|e| WalletError::Provider(e.to_string()))?;
        Ok(decode_address_return(&ret)?)
    }
}
