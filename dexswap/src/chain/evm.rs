use super::Chain;
use crate::prelude::*;

sol! {
    contract IERC20 {
        function decimals() external view returns (uint8);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

pub struct EvmChain {
    chain_id: u64,
    rpc_url: String,
    provider: Box<dyn Provider>,
    http_client: Client,
    request_timeout: Duration,
    poll_interval: Duration,
}

impl EvmChain {
    pub fn new(chain_id: u64, rpc_url: &str, options: &SwapOptions) -> Result<Self> {
        let url = rpc_url
            .parse()
            .with_context(|| format!("Invalid RPC url {}", rpc_url))?;
        let provider = ProviderBuilder::new().on_http(url);
        let request_timeout = Duration::from_secs(options.rpc_timeout);
        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build http client")?;
        Ok(Self {
            chain_id,
            rpc_url: rpc_url.to_string(),
            provider: Box::new(provider),
            http_client,
            request_timeout,
            poll_interval: Duration::from_millis(options.poll_interval_ms),
        })
    }

    async fn call(&self, to: Address, calldata: Vec<u8>) -> Result<Bytes> {
        let tx = TransactionRequest::default().to(to).input(calldata.into());
        Ok(self.provider.call(&tx).await?)
    }
}

#[async_trait]
impl Chain for EvmChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .with_context(|| format!("Failed to fetch nonce for {}", address))
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .context("Failed to fetch gas price")
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let calldata = IERC20::allowanceCall { owner, spender }.abi_encode();
        let output = self
            .call(token, calldata)
            .await
            .with_context(|| format!("Failed to fetch allowance of {} on {}", owner, token))?;
        Ok(IERC20::allowanceCall::abi_decode_returns(&output, true)?._0)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        let calldata = IERC20::decimalsCall {}.abi_encode();
        let output = self
            .call(token, calldata)
            .await
            .with_context(|| format!("Failed to fetch decimals of {}", token))?;
        Ok(IERC20::decimalsCall::abi_decode_returns(&output, true)?._0)
    }

    async fn send_transaction(&self, tx: TxLegacy, signer: &PrivateKeySigner) -> Result<TxHash> {
        let (hash, raw_tx) = sign_transaction(signer, tx)?;
        debug!("Sending raw transaction {} to {}", hash, self.rpc_url);
        let sent = send_raw_transaction(&self.http_client, &self.rpc_url, raw_tx, self.request_timeout)
            .await?;
        if sent != hash {
            warn!("Node reported hash {} for locally signed {}", sent, hash);
        }
        Ok(sent)
    }

    async fn wait_for_receipt(&self, hash: TxHash, timeout: Duration) -> Result<Confirmation> {
        wait_for_transaction(self.provider.as_ref(), hash, timeout, self.poll_interval).await
    }
}
