use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use ethers::abi::{self, Token};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Transaction, TransactionReceipt, H256, U256, U64};
use ethers::utils::{keccak256, rlp::Rlp};
use penguin_mint::input::{mints_in_progress_call, request_mint_call};
use penguin_node::config::WalletConfig;
use penguin_node::errors::WalletError;
use penguin_node::wallet::{Wallet, FALLBACK_GAS_LIMIT};
use serde_json::{json, Value};

const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Minimal JSON-RPC chain: one account, instant inclusion in block 1.
#[derive(Default)]
struct MockChain {
    estimate: Option<u64>,
    receipt_status: u64,
    owner: Address,
    methods: Mutex<Vec<String>>,
    raw_txs: Mutex<Vec<Vec<u8>>>,
    call_data: Mutex<Vec<String>>,
}

impl MockChain {
    fn sent(&self) -> Vec<TypedTransaction> {
        self.raw_txs
            .lock()
            .unwrap()
            .iter()
            .map(|raw| TypedTransaction::decode_signed(&Rlp::new(raw)).unwrap().0)
            .collect()
    }

    fn called(&self, method: &str) -> bool {
        self.methods.lock().unwrap().iter().any(|m| m == method)
    }
}

async fn rpc(State(chain): State<Arc<MockChain>>, Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default().to_string();
    chain.methods.lock().unwrap().push(method.clone());
    let param = |i: usize| req["params"][i].clone();

    let result = match method.as_str() {
        "eth_chainId" => json!("0x7a69"),
        "eth_estimateGas" => match chain.estimate {
            Some(gas) => json!(format!("{gas:#x}")),
            None => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32000, "message": "execution reverted"}
                }))
            }
        },
        "eth_getTransactionCount" => json!("0x0"),
        "eth_gasPrice" => json!("0x3b9aca00"),
        "eth_sendRawTransaction" => {
            let text = param(0).as_str().unwrap().trim_start_matches("0x").to_string();
            let raw = hex::decode(text).unwrap();
            let hash = H256::from(keccak256(&raw));
            chain.raw_txs.lock().unwrap().push(raw);
            json!(hash)
        }
        "eth_getTransactionByHash" => {
            let hash: H256 = serde_json::from_value(param(0)).unwrap();
            serde_json::to_value(Transaction {
                hash,
                block_number: Some(U64::one()),
                ..Default::default()
            })
            .unwrap()
        }
        "eth_getTransactionReceipt" => {
            let hash: H256 = serde_json::from_value(param(0)).unwrap();
            serde_json::to_value(TransactionReceipt {
                transaction_hash: hash,
                block_number: Some(U64::one()),
                status: Some(U64::from(chain.receipt_status)),
                ..Default::default()
            })
            .unwrap()
        }
        "eth_call" => {
            let data = param(0)["data"]
                .as_str()
                .or_else(|| param(0)["input"].as_str())
                .unwrap_or_default()
                .to_string();
            chain.call_data.lock().unwrap().push(data);
            json!(format!("0x{}", hex::encode(abi::encode(&[Token::Address(chain.owner)]))))
        }
        other => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": -32601, "message": format!("method {other} not found")}
            }))
        }
    };
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

async fn spawn_chain(chain: MockChain) -> (Arc<MockChain>, WalletConfig) {
    let chain = Arc::new(chain);
    let app = Router::new().route("/", post(rpc)).with_state(chain.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let cfg = WalletConfig {
        private_key: Some(DEV_KEY.to_string()),
        rpc_url: format!("http://{addr}"),
        ..Default::default()
    };
    (chain, cfg)
}

#[tokio::test]
async fn test_request_mint_falls_back_on_failed_estimate() {
    let (chain, cfg) = spawn_chain(MockChain {
        receipt_status: 1,
        ..Default::default()
    })
    .await;

    let wallet = Wallet::connect(&cfg).await.unwrap();
    assert!(chain.called("eth_chainId"));

    let receipt = wallet.request_mint(U256::from(31337u64)).await.unwrap();
    assert_eq!(receipt.block_number, Some(U64::one()));
    assert!(chain.called("eth_estimateGas"));

    let sent = chain.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].gas(), Some(&U256::from(FALLBACK_GAS_LIMIT)));
    assert_eq!(sent[0].to_addr(), Some(&cfg.contract));
    assert_eq!(
        sent[0].data().map(|d| d.to_vec()),
        Some(request_mint_call(U256::from(31337u64)))
    );
}

#[tokio::test]
async fn test_request_mint_uses_estimate() {
    let (chain, cfg) = spawn_chain(MockChain {
        estimate: Some(90_000),
        receipt_status: 1,
        ..Default::default()
    })
    .await;

    let wallet = Wallet::connect(&cfg).await.unwrap();
    wallet.request_mint(U256::from(7u64)).await.unwrap();
    assert_eq!(chain.sent()[0].gas(), Some(&U256::from(90_000u64)));
}

#[tokio::test]
async fn test_reverted_receipt_is_an_error() {
    let (chain, cfg) = spawn_chain(MockChain {
        receipt_status: 0,
        ..Default::default()
    })
    .await;

    let wallet = Wallet::connect(&cfg).await.unwrap();
    let err = wallet.request_mint(U256::from(5u64)).await.unwrap_err();
    assert!(matches!(err, WalletError::Reverted { .. }), "{err:?}");
    assert_eq!(chain.sent().len(), 1);
}

#[tokio::test]
async fn test_mint_in_progress_decodes_owner() {
    let owner = Address::repeat_byte(0xab);
    let (chain, cfg) = spawn_chain(MockChain {
        owner,
        ..Default::default()
    })
    .await;

    let digest = [0x11u8; 32];
    let wallet = Wallet::connect(&cfg).await.unwrap();
    assert_eq!(wallet.mint_in_progress(digest).await.unwrap(), owner);

    let calls = chain.call_data.lock().unwrap().clone();
    assert_eq!(calls, vec![format!("0x{}", hex::encode(mints_in_progress_call(digest)))]);
}
