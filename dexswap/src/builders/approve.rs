use crate::aggregator::ApproveTransaction;
use crate::prelude::*;

/// ERC-20 approval built from the aggregator's approve-transaction calldata
pub struct ApproveBuilder<'a> {
    pub chain_id: u64,
    pub token: Address,
    pub approval: &'a ApproveTransaction,
    /// Gas price reported by the node, before padding
    pub gas_price: u128,
    pub options: &'a SwapOptions,
}

impl Builder for ApproveBuilder<'_> {
    fn build_transaction(&self, nonce: u64) -> Result<TxLegacy> {
        let gas_limit = parse_u64("gasLimit", &self.approval.gas_limit)?;

        let mut tx = TxLegacy::default();
        tx.nonce = nonce;
        tx.gas_price = pad_u128(self.gas_price, self.options.gas_price_padding_pct)?;
        tx.gas_limit = pad_u64(gas_limit, self.options.gas_limit_padding_pct)?;
        tx.to = TxKind::Call(self.token);
        tx.value = U256::ZERO;
        tx.input = self.approval.data.clone();
        tx.chain_id = Some(self.chain_id);
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval(gas_limit: &str) -> ApproveTransaction {
        ApproveTransaction {
            data: Bytes::from(vec![0x09, 0x5e, 0xa7, 0xb3]),
            spender_address: Address::repeat_byte(0x11),
            gas_limit: gas_limit.to_string(),
            gas_price: None,
        }
    }

    #[test]
    fn pads_node_gas_price_and_api_gas_limit() {
        let token = Address::repeat_byte(0x22);
        let approval = approval("50000");
        let options = SwapOptions::default();
        let tx = ApproveBuilder {
            chain_id: 56,
            token,
            approval: &approval,
            gas_price: 3_000_000_001,
            options: &options,
        }
        .build_transaction(4)
        .unwrap();

        assert_eq!(tx.nonce, 4);
        assert_eq!(tx.gas_price, 4_500_000_001);
        assert_eq!(tx.gas_limit, 75_000);
        assert_eq!(tx.to, TxKind::Call(token));
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.input, approval.data);
        assert_eq!(tx.chain_id, Some(56));
    }

    #[test]
    fn rejects_malformed_gas_limit() {
        let approval = approval("lots");
        let options = SwapOptions::default();
        let err = ApproveBuilder {
            chain_id: 1,
            token: Address::ZERO,
            approval: &approval,
            gas_price: 1,
            options: &options,
        }
        .build_transaction(0)
        .unwrap_err();
        assert!(err.to_string().contains("gasLimit"));
    }
}
