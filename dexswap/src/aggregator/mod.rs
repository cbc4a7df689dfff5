pub mod okx;

use std::collections::BTreeMap;

use crate::prelude::*;

pub use okx::{OkxClient, OkxCredentials};

/// Parameters for the aggregator's approve-transaction endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ApproveRequest {
    pub chain_id: u64,
    pub token: Address,
    /// Amount to approve, in base units
    pub amount: U256,
}

/// Approval calldata and the spender it targets
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveTransaction {
    pub data: Bytes,
    #[serde(alias = "dexContractAddress")]
    pub spender_address: Address,
    pub gas_limit: String,
    #[serde(default)]
    pub gas_price: Option<String>,
}

/// Parameters for the aggregator's swap endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub chain_id: u64,
    pub from_token: Address,
    pub to_token: Address,
    /// Amount of `from_token` to sell, in base units
    pub amount: U256,
    pub user_wallet: Address,
    pub slippage: String,
    pub receiver: Option<Address>,
    /// Provider specific query parameters forwarded verbatim
    pub extra: BTreeMap<String, String>,
}

/// Ready to sign transaction returned by the swap endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTx {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub gas: String,
    pub gas_price: String,
    pub value: String,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(default)]
    pub min_receive_amount: Option<String>,
    #[serde(default)]
    pub slippage: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    #[serde(default)]
    pub router_result: Value,
    pub tx: SwapTx,
}

/// A DEX aggregator that can produce approval and swap transactions
#[async_trait]
pub trait Aggregator: Send + Sync {
    async fn approve_transaction(&self, request: &ApproveRequest) -> Result<ApproveTransaction>;

    async fn swap(&self, request: &SwapRequest) -> Result<SwapQuote>;
}

impl ApproveRequest {
    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("chainId".to_string(), self.chain_id.to_string()),
            ("tokenContractAddress".to_string(), self.token.to_string()),
            ("approveAmount".to_string(), self.amount.to_string()),
        ]
    }
}

impl SwapRequest {
    /// Query pairs with each key once: extras override the fixed keys and the
    /// receiver overrides both
    pub fn query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("chainId".to_string(), self.chain_id.to_string()),
            ("fromTokenAddress".to_string(), self.from_token.to_string()),
            ("toTokenAddress".to_string(), self.to_token.to_string()),
            ("amount".to_string(), self.amount.to_string()),
            ("userWalletAddress".to_string(), self.user_wallet.to_string()),
            ("slippage".to_string(), self.slippage.clone()),
        ];
        for (key, value) in &self.extra {
            set_param(&mut params, key, value.clone());
        }
        if let Some(receiver) = self.receiver {
            set_param(&mut params, "swapReceiverAddress", receiver.to_string());
        }
        params
    }
}

fn set_param(params: &mut Vec<(String, String)>, key: &str, value: String) {
    match params.iter_mut().find(|(k, _)| k == key) {
        Some(param) => param.1 = value,
        None => params.push((key.to_string(), value)),
    }
}
