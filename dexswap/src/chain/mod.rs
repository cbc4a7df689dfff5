pub mod evm;

use crate::prelude::*;

pub use evm::EvmChain;

/// Node access needed by the swap flow on a single chain
#[async_trait]
pub trait Chain: Send + Sync {
    fn chain_id(&self) -> u64;

    async fn nonce(&self, address: Address) -> Result<u64>;

    async fn gas_price(&self) -> Result<u128>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    async fn token_decimals(&self, token: Address) -> Result<u8>;

    /// Sign `tx` with `signer` and broadcast it
    async fn send_transaction(&self, tx: TxLegacy, signer: &PrivateKeySigner) -> Result<TxHash>;

    async fn wait_for_receipt(&self, hash: TxHash, timeout: Duration) -> Result<Confirmation>;
}
