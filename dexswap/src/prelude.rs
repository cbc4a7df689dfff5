use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;

pub use alloy::consensus::SignableTransaction;
pub use alloy::rpc::types::TransactionRequest;
pub use alloy::sol;
pub use alloy::{
    consensus::TxLegacy,
    network::TxSignerSync,
    primitives::{Address, Bytes, TxHash, TxKind, U256},
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
pub use serde::{Deserialize, Serialize};

pub use anyhow::{anyhow, bail, Context, Error, Result};
pub use async_trait::async_trait;
pub use dotenv::dotenv;
pub use reqwest::Client;
pub use serde_json::Value;
pub use std::sync::Arc;
pub use std::time::Duration;
pub use tokio::time::sleep;
pub use tracing::{debug, error, info, warn};

use crate::tokens::NativeToken;

pub const DEFAULT_SLIPPAGE: &str = "0.03";

#[derive(Debug, Clone, Deserialize)]
pub struct OkxConfig {
    #[serde(default = "default_okx_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_okx_base_url() -> String {
    "https://web3.okx.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for OkxConfig {
    fn default() -> Self {
        Self {
            base_url: default_okx_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    /// Overrides the built-in native token entry for this chain.
    pub native: Option<NativeToken>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub address: Address,
    /// Name of the environment variable holding the hex private key.
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
}

fn default_private_key_env() -> String {
    "PRIVATE_KEY".to_string()
}

// Unified configuration for the swap flow
#[derive(Debug, Deserialize)]
pub struct UnifiedConfig {
    #[serde(default)]
    pub okx: OkxConfig,
    pub chains: BTreeMap<u64, ChainConfig>,
    pub wallets: HashMap<String, WalletConfig>,
    #[serde(default)]
    pub swap: SwapOptions,
}

/// Knobs for transaction construction and confirmation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwapOptions {
    pub default_slippage: String,
    pub gas_price_padding_pct: u64,
    pub gas_limit_padding_pct: u64,
    pub confirmation_timeout: u64,
    pub poll_interval_ms: u64,
    /// Seconds before a raw transaction submission to the node is abandoned
    pub rpc_timeout: u64,
}

impl Default for SwapOptions {
    fn default() -> Self {
        Self {
            default_slippage: DEFAULT_SLIPPAGE.to_string(),
            gas_price_padding_pct: 150,
            gas_limit_padding_pct: 150,
            confirmation_timeout: 120,
            poll_interval_ms: 100,
            rpc_timeout: 10,
        }
    }
}

/// A trait for building transactions
pub trait Builder {
    /// Create an unsigned legacy transaction for the given nonce
    fn build_transaction(&self, nonce: u64) -> Result<TxLegacy>;
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: usize,
    pub method: String,
    pub params: Vec<String>,
}

pub fn read_config_file<T>(filename: &str) -> Result<T>
where
    T: for<'a> Deserialize<'a>,
{
    let mut file =
        File::open(filename).with_context(|| format!("Failed to open config file {}", filename))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    // Parse the YAML into our Config struct
    let config: T = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", filename))?;
    Ok(config)
}

/// Read a hex private key (with or without 0x prefix) from an environment variable
pub fn signer_from_env(var: &str) -> Result<PrivateKeySigner> {
    let private_key = std::env::var(var).with_context(|| format!("{} must be set", var))?;
    private_key
        .trim()
        .trim_start_matches("0x")
        .parse::<PrivateKeySigner>()
        .with_context(|| format!("{} is not a valid private key", var))
}

/// Scale a gas value by a percentage, rounding down
pub fn pad_u64(value: u64, pct: u64) -> Result<u64> {
    let padded = pad_u128(value as u128, pct)?;
    u64::try_from(padded).with_context(|| format!("Padded gas value {} exceeds u64", padded))
}

pub fn pad_u128(value: u128, pct: u64) -> Result<u128> {
    value
        .checked_mul(pct as u128)
        .map(|scaled| scaled / 100)
        .ok_or_else(|| anyhow!("Padding {} by {}% overflows", value, pct))
}

pub fn parse_u64(field: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid {}: {:?}", field, value))
}

pub fn parse_u128(field: &str, value: &str) -> Result<u128> {
    value
        .trim()
        .parse::<u128>()
        .with_context(|| format!("Invalid {}: {:?}", field, value))
}

pub fn parse_u256(field: &str, value: &str) -> Result<U256> {
    U256::from_str_radix(value.trim(), 10).with_context(|| format!("Invalid {}: {:?}", field, value))
}

/// Sign a legacy transaction and return its hash together with the raw 0x-prefixed encoding
pub fn sign_transaction(signer: &PrivateKeySigner, mut tx: TxLegacy) -> Result<(TxHash, String)> {
    let signature = signer
        .sign_transaction_sync(&mut tx)
        .context("Failed to sign transaction")?;
    let signed_tx = tx.into_signed(signature);
    let hash = *signed_tx.hash();

    let mut buf = Vec::new();
    signed_tx.rlp_encode(&mut buf);
    Ok((hash, format!("0x{}", hex::encode(buf))))
}

/// Outcome of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Poll for transaction receipt until it completes or times out using Alloy provider
pub async fn wait_for_transaction(
    provider: &dyn Provider,
    hash: TxHash,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Confirmation> {
    info!("Waiting for transaction {} to be mined...", hash);

    let start_time = std::time::Instant::now();

    while start_time.elapsed() < timeout {
        match provider.get_transaction_receipt(hash).await {
            Ok(Some(receipt)) => {
                let success = receipt.status();
                if success {
                    info!("Transaction {} successfully mined!", hash);
                } else {
                    warn!("Transaction {} mined but failed!", hash);
                }
                return Ok(Confirmation {
                    success,
                    block_number: receipt.block_number,
                });
            }
            Ok(None) => {
                // Transaction not yet mined, continue polling
            }
            Err(e) => {
                error!("Error querying receipt: {:?}", e);
            }
        }

        sleep(poll_interval).await;
    }

    bail!(
        "Transaction {} was not mined within {} seconds",
        hash,
        timeout.as_secs()
    )
}

/// Submit a signed raw transaction with eth_sendRawTransaction
pub async fn send_raw_transaction(
    http_client: &Client,
    url: &str,
    raw_tx: String,
    timeout: Duration,
) -> Result<TxHash> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: 1,
        method: "eth_sendRawTransaction".to_string(),
        params: vec![raw_tx],
    };

    let body: Value = http_client
        .post(url)
        .json(&request)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("URL {} request failed", url))?
        .error_for_status()?
        .json()
        .await
        .with_context(|| format!("URL {} returned an invalid response", url))?;

    if let Some(err) = body.get("error") {
        bail!("URL {} RPC error: {}", url, err);
    }
    let result = body
        .get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("URL {} response has no result: {}", url, body))?;
    result
        .parse::<TxHash>()
        .with_context(|| format!("Invalid transaction hash {:?}", result))
}
