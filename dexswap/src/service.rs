use std::collections::{BTreeMap, HashMap};

use crate::aggregator::{
    Aggregator, ApproveRequest, OkxClient, OkxCredentials, SwapQuote, SwapRequest,
};
use crate::builders::{ApproveBuilder, SwapTxBuilder};
use crate::chain::{Chain, EvmChain};
use crate::prelude::*;
use crate::tokens::{is_native, parse_token_amount, NativeTokens};
use crate::wallet::{Wallet, Wallets, DEFAULT_WALLET};

/// What to swap, as entered by the user
#[derive(Debug, Clone)]
pub struct SwapParams {
    pub chain_id: u64,
    pub from_token: Address,
    pub to_token: Address,
    /// Human readable amount of `from_token`, e.g. "1.5"
    pub amount: String,
    pub recipient: Option<Address>,
    /// Falls back to the configured default slippage
    pub slippage: Option<String>,
    pub wallet: String,
    pub extra: BTreeMap<String, String>,
}

impl SwapParams {
    pub fn new(chain_id: u64, from_token: Address, to_token: Address, amount: &str) -> Self {
        Self {
            chain_id,
            from_token,
            to_token,
            amount: amount.to_string(),
            recipient: None,
            slippage: None,
            wallet: DEFAULT_WALLET.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

/// Drives approve, quote and swap against an aggregator and the chains it trades on
pub struct SwapService {
    aggregator: Arc<dyn Aggregator>,
    chains: HashMap<u64, Arc<dyn Chain>>,
    native_tokens: NativeTokens,
    wallets: Wallets,
    options: SwapOptions,
}

impl SwapService {
    pub fn new(
        aggregator: Arc<dyn Aggregator>,
        chains: Vec<Arc<dyn Chain>>,
        native_tokens: NativeTokens,
        wallets: Wallets,
        options: SwapOptions,
    ) -> Self {
        Self {
            aggregator,
            chains: chains.into_iter().map(|c| (c.chain_id(), c)).collect(),
            native_tokens,
            wallets,
            options,
        }
    }

    /// Wire up the OKX client, one RPC helper per configured chain and the wallets
    pub fn from_config(config: &UnifiedConfig) -> Result<Self> {
        let aggregator = OkxClient::new(
            &config.okx.base_url,
            OkxCredentials::from_env()?,
            Duration::from_secs(config.okx.request_timeout),
        )?;

        let mut native_tokens = NativeTokens::default();
        let mut chains: Vec<Arc<dyn Chain>> = Vec::new();
        for (chain_id, chain_config) in &config.chains {
            if let Some(native) = &chain_config.native {
                native_tokens.insert(*chain_id, native.clone());
            }
            chains.push(Arc::new(EvmChain::new(
                *chain_id,
                &chain_config.rpc_url,
                &config.swap,
            )?));
        }

        Ok(Self::new(
            Arc::new(aggregator),
            chains,
            native_tokens,
            Wallets::from_config(&config.wallets)?,
            config.swap.clone(),
        ))
    }

    pub fn wallet(&self, name: &str) -> Result<&Wallet> {
        self.wallets.get(name)
    }

    fn chain(&self, chain_id: u64) -> Result<&Arc<dyn Chain>> {
        self.chains
            .get(&chain_id)
            .ok_or_else(|| anyhow!("Unsupported chain ID: {}", chain_id))
    }

    /// Check the aggregator spender's allowance and send an approval when it is short
    pub async fn check_and_approve(
        &self,
        chain_id: u64,
        token: Address,
        wallet: &Wallet,
        amount: U256,
    ) -> Result<Option<TxHash>> {
        self.try_check_and_approve(chain_id, token, wallet, amount)
            .await
            .inspect_err(|e| error!("Failed to check and approve: {:#}", e))
    }

    async fn try_check_and_approve(
        &self,
        chain_id: u64,
        token: Address,
        wallet: &Wallet,
        amount: U256,
    ) -> Result<Option<TxHash>> {
        let chain = self.chain(chain_id)?;

        let approval = self
            .aggregator
            .approve_transaction(&ApproveRequest {
                chain_id,
                token,
                amount,
            })
            .await?;

        let current_allowance = chain
            .allowance(token, wallet.address, approval.spender_address)
            .await?;
        if current_allowance >= amount {
            debug!(
                "Allowance {} of {} already covers {}",
                current_allowance, approval.spender_address, amount
            );
            return Ok(None);
        }

        info!(
            "Current allowance {} is less than required amount {}, approving...",
            current_allowance, amount
        );
        let gas_price = chain.gas_price().await?;
        let nonce = chain.nonce(wallet.address).await?;
        let tx = ApproveBuilder {
            chain_id,
            token,
            approval: &approval,
            gas_price,
            options: &self.options,
        }
        .build_transaction(nonce)?;

        let tx_hash = chain.send_transaction(tx, &wallet.signer).await?;
        info!("Approval transaction sent: {}", tx_hash);
        Ok(Some(tx_hash))
    }

    /// Convert a human readable amount of `token` into base units
    pub async fn amount_in_base_units(&self, chain_id: u64, token: Address, amount: &str) -> Result<U256> {
        self.try_amount_in_base_units(chain_id, token, amount)
            .await
            .inspect_err(|e| {
                error!(
                    "Failed to convert amount {} for token {}: {:#}",
                    amount, token, e
                )
            })
    }

    async fn try_amount_in_base_units(&self, chain_id: u64, token: Address, amount: &str) -> Result<U256> {
        let decimals = if is_native(&token) {
            self.native_tokens.get(chain_id)?.decimals
        } else {
            self.chain(chain_id)?.token_decimals(token).await?
        };
        parse_token_amount(amount, decimals)
    }

    /// Ask the aggregator for a swap transaction selling `params.amount` of `params.from_token`
    pub async fn create_swap_transaction(&self, params: &SwapParams, user: Address) -> Result<SwapQuote> {
        self.try_create_swap_transaction(params, user)
            .await
            .inspect_err(|e| error!("Failed to create swap transaction: {:#}", e))
    }

    async fn try_create_swap_transaction(&self, params: &SwapParams, user: Address) -> Result<SwapQuote> {
        let raw_amount = self
            .amount_in_base_units(params.chain_id, params.from_token, &params.amount)
            .await?;

        let request = SwapRequest {
            chain_id: params.chain_id,
            from_token: params.from_token,
            to_token: params.to_token,
            amount: raw_amount,
            user_wallet: user,
            slippage: params
                .slippage
                .clone()
                .unwrap_or_else(|| self.options.default_slippage.clone()),
            receiver: params.recipient,
            extra: params.extra.clone(),
        };
        debug!("create_swap_transaction params: {:?}", request);

        let quote = self.aggregator.swap(&request).await?;
        info!(
            "Created swap transaction for {} of {} to {}",
            params.amount, params.from_token, params.to_token
        );
        info!(
            "Recipient address: {}",
            params.recipient.unwrap_or(user)
        );
        Ok(quote)
    }

    /// Approve if needed, wait for the approval, then sign and broadcast the swap
    pub async fn execute_swap(&self, params: &SwapParams) -> Result<TxHash> {
        self.try_execute_swap(params)
            .await
            .inspect_err(|e| error!("Failed to execute swap: {:#}", e))
    }

    async fn try_execute_swap(&self, params: &SwapParams) -> Result<TxHash> {
        let wallet = self.wallets.get(&params.wallet)?;
        let chain = self.chain(params.chain_id)?;

        let raw_amount = self
            .amount_in_base_units(params.chain_id, params.from_token, &params.amount)
            .await?;

        if !is_native(&params.from_token) {
            let approve_tx = self
                .check_and_approve(params.chain_id, params.from_token, wallet, raw_amount)
                .await?;
            if let Some(approve_tx) = approve_tx {
                let confirmation = chain
                    .wait_for_receipt(
                        approve_tx,
                        Duration::from_secs(self.options.confirmation_timeout),
                    )
                    .await?;
                if !confirmation.success {
                    bail!("Approval transaction {} reverted", approve_tx);
                }
            }
        }

        let quote = self.create_swap_transaction(params, wallet.address).await?;
        debug!("Swap data: {:?}", quote);

        let nonce = chain.nonce(wallet.address).await?;
        let tx = SwapTxBuilder {
            chain_id: params.chain_id,
            swap: &quote.tx,
            options: &self.options,
        }
        .build_transaction(nonce)?;

        let tx_hash = chain.send_transaction(tx, &wallet.signer).await?;
        info!("Swap transaction sent: {}", tx_hash);
        Ok(tx_hash)
    }
}
