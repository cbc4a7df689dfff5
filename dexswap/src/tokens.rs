use std::collections::HashMap;

use alloy::primitives::address;
use alloy::primitives::utils::{parse_units, ParseUnits};

use crate::prelude::*;

/// Placeholder address aggregators use for a chain's native token
pub const NATIVE_TOKEN_ADDRESS: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

pub fn is_native(token: &Address) -> bool {
    *token == NATIVE_TOKEN_ADDRESS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NativeToken {
    pub symbol: String,
    pub decimals: u8,
}

impl NativeToken {
    fn new(symbol: &str, decimals: u8) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

/// Native token metadata keyed by chain id
#[derive(Debug, Clone)]
pub struct NativeTokens {
    tokens: HashMap<u64, NativeToken>,
}

impl Default for NativeTokens {
    fn default() -> Self {
        let tokens = [
            (1, NativeToken::new("ETH", 18)),
            (10, NativeToken::new("ETH", 18)),
            (56, NativeToken::new("BNB", 18)),
            (100, NativeToken::new("XDAI", 18)),
            (137, NativeToken::new("POL", 18)),
            (250, NativeToken::new("FTM", 18)),
            (324, NativeToken::new("ETH", 18)),
            (8453, NativeToken::new("ETH", 18)),
            (42161, NativeToken::new("ETH", 18)),
            (43114, NativeToken::new("AVAX", 18)),
            (59144, NativeToken::new("ETH", 18)),
        ];
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

impl NativeTokens {
    pub fn empty() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    pub fn insert(&mut self, chain_id: u64, token: NativeToken) {
        self.tokens.insert(chain_id, token);
    }

    pub fn get(&self, chain_id: u64) -> Result<&NativeToken> {
        self.tokens
            .get(&chain_id)
            .ok_or_else(|| anyhow!("Unsupported chain ID: {}", chain_id))
    }
}

/// Convert a human readable decimal amount into base units
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if amount.is_empty() {
        bail!("Amount must not be empty");
    }
    match parse_units(amount, decimals)
        .with_context(|| format!("Invalid amount {:?} for {} decimals", amount, decimals))?
    {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => bail!("Amount must not be negative: {}", amount),
    }
}
