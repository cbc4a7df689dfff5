#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::primitives::{address, keccak256};
use serde_json::json;
use wiremock::{Request, Respond, ResponseTemplate};

use dexswap::aggregator::{
    Aggregator, ApproveRequest, ApproveTransaction, SwapQuote, SwapRequest, SwapTx,
};
use dexswap::chain::Chain;
use dexswap::prelude::*;
use dexswap::wallet::Wallet;

pub const USDT: Address = address!("5555555555555555555555555555555555555555");
pub const WETH: Address = address!("7777777777777777777777777777777777777777");
pub const SPENDER: Address = address!("4040404040404040404040404040404040404040");
pub const ROUTER: Address = address!("9090909090909090909090909090909090909090");

pub fn wallet(name: &str) -> Wallet {
    let signer = PrivateKeySigner::random();
    Wallet::new(name, signer.address(), signer).unwrap()
}

pub fn approval() -> ApproveTransaction {
    ApproveTransaction {
        data: Bytes::from(vec![0x09, 0x5e, 0xa7, 0xb3, 0x01]),
        spender_address: SPENDER,
        gas_limit: "50000".to_string(),
        gas_price: Some("110000000".to_string()),
    }
}

pub fn quote(from: Address) -> SwapQuote {
    SwapQuote {
        router_result: json!({ "toTokenAmount": "990000" }),
        tx: SwapTx {
            from,
            to: ROUTER,
            data: Bytes::from(vec![0x12, 0x34]),
            gas: "200000".to_string(),
            gas_price: "2000000000".to_string(),
            value: "0".to_string(),
            max_priority_fee_per_gas: None,
            min_receive_amount: Some("980000".to_string()),
            slippage: Some("0.03".to_string()),
        },
    }
}

/// Aggregator double returning canned responses and recording requests
#[derive(Default)]
pub struct FakeAggregator {
    pub approval: Option<ApproveTransaction>,
    pub quote: Option<SwapQuote>,
    pub approve_requests: Mutex<Vec<ApproveRequest>>,
    pub swap_requests: Mutex<Vec<SwapRequest>>,
}

impl FakeAggregator {
    pub fn new(approval: ApproveTransaction, quote: SwapQuote) -> Self {
        Self {
            approval: Some(approval),
            quote: Some(quote),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Aggregator for FakeAggregator {
    async fn approve_transaction(&self, request: &ApproveRequest) -> Result<ApproveTransaction> {
        self.approve_requests.lock().unwrap().push(request.clone());
        self.approval
            .clone()
            .ok_or_else(|| anyhow!("OKX API error 82000: Insufficient liquidity"))
    }

    async fn swap(&self, request: &SwapRequest) -> Result<SwapQuote> {
        self.swap_requests.lock().unwrap().push(request.clone());
        self.quote
            .clone()
            .ok_or_else(|| anyhow!("OKX API error 82000: Insufficient liquidity"))
    }
}

/// In-memory chain whose nonce advances with every sent transaction
pub struct FakeChain {
    pub chain_id: u64,
    pub gas_price: u128,
    pub decimals: u8,
    pub receipt_success: bool,
    pub nonce: Mutex<u64>,
    pub allowance: Mutex<U256>,
    pub allowance_queries: Mutex<Vec<(Address, Address, Address)>>,
    pub sent: Mutex<Vec<(TxLegacy, Address, TxHash)>>,
    pub waited: Mutex<Vec<TxHash>>,
    pub events: Mutex<Vec<&'static str>>,
}

impl FakeChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            gas_price: 1_000_000_001,
            decimals: 6,
            receipt_success: true,
            nonce: Mutex::new(7),
            allowance: Mutex::new(U256::ZERO),
            allowance_queries: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            waited: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        *self.allowance.lock().unwrap() = allowance;
        self
    }

    fn record(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(TxLegacy, Address, TxHash)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Chain for FakeChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn nonce(&self, _address: Address) -> Result<u64> {
        self.record("nonce");
        Ok(*self.nonce.lock().unwrap())
    }

    async fn gas_price(&self) -> Result<u128> {
        self.record("gas_price");
        Ok(self.gas_price)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.record("allowance");
        self.allowance_queries
            .lock()
            .unwrap()
            .push((token, owner, spender));
        Ok(*self.allowance.lock().unwrap())
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8> {
        self.record("decimals");
        Ok(self.decimals)
    }

    async fn send_transaction(&self, tx: TxLegacy, signer: &PrivateKeySigner) -> Result<TxHash> {
        self.record("send");
        let (hash, _) = sign_transaction(signer, tx.clone())?;
        self.sent.lock().unwrap().push((tx, signer.address(), hash));
        *self.nonce.lock().unwrap() += 1;
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash, _timeout: Duration) -> Result<Confirmation> {
        self.record("wait");
        self.waited.lock().unwrap().push(hash);
        Ok(Confirmation {
            success: self.receipt_success,
            block_number: Some(100),
        })
    }
}

/// JSON-RPC node double answering by method name and echoing the request id
pub struct RpcResponder {
    results: HashMap<String, Value>,
    errors: HashMap<String, Value>,
}

impl RpcResponder {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn result(mut self, method: &str, result: Value) -> Self {
        self.results.insert(method.to_string(), result);
        self
    }

    pub fn error(mut self, method: &str, message: &str) -> Self {
        self.errors
            .insert(method.to_string(), json!({ "code": -32000, "message": message }));
        self
    }
}

impl Respond for RpcResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let method = body["method"].as_str().unwrap_or_default();
        let id = body["id"].clone();

        if let Some(error) = self.errors.get(method) {
            return ResponseTemplate::new(200)
                .set_body_json(json!({ "jsonrpc": "2.0", "id": id, "error": error }));
        }
        let result = match (method, self.results.get(method)) {
            (_, Some(result)) => result.clone(),
            ("eth_sendRawTransaction", None) => {
                let raw = body["params"][0].as_str().unwrap_or_default();
                let bytes = hex::decode(raw.trim_start_matches("0x")).unwrap();
                json!(keccak256(bytes))
            }
            _ => {
                return ResponseTemplate::new(200).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32601, "message": format!("method {} not found", method) }
                }))
            }
        };
        ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
    }
}
