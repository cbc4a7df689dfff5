use crate::aggregator::SwapTx;
use crate::prelude::*;

/// Swap transaction built from the aggregator's `tx` object
pub struct SwapTxBuilder<'a> {
    pub chain_id: u64,
    pub swap: &'a SwapTx,
    pub options: &'a SwapOptions,
}

impl Builder for SwapTxBuilder<'_> {
    fn build_transaction(&self, nonce: u64) -> Result<TxLegacy> {
        let gas_price = parse_u128("gasPrice", &self.swap.gas_price)?;
        let gas_limit = parse_u64("gas", &self.swap.gas)?;

        let mut tx = TxLegacy::default();
        tx.nonce = nonce;
        tx.gas_price = pad_u128(gas_price, self.options.gas_price_padding_pct)?;
        tx.gas_limit = pad_u64(gas_limit, self.options.gas_limit_padding_pct)?;
        tx.to = TxKind::Call(self.swap.to);
        tx.value = parse_u256("value", &self.swap.value)?;
        tx.input = self.swap.data.clone();
        tx.chain_id = Some(self.chain_id);
        Ok(tx)
    }
}
