use std::collections::HashMap;

use crate::prelude::*;

pub const DEFAULT_WALLET: &str = "default";

#[derive(Debug, Clone)]
pub struct Wallet {
    pub name: String,
    pub address: Address,
    pub signer: PrivateKeySigner,
}

impl Wallet {
    pub fn new(name: &str, address: Address, signer: PrivateKeySigner) -> Result<Self> {
        if signer.address() != address {
            bail!(
                "Wallet {} is configured with address {} but its key controls {}",
                name,
                address,
                signer.address()
            );
        }
        Ok(Self {
            name: name.to_string(),
            address,
            signer,
        })
    }

    pub fn from_config(name: &str, config: &WalletConfig) -> Result<Self> {
        let signer = signer_from_env(&config.private_key_env)?;
        Self::new(name, config.address, signer)
    }
}

/// Named wallets, with lookups of unknown names falling back to the `default` entry
#[derive(Debug, Clone, Default)]
pub struct Wallets {
    wallets: HashMap<String, Wallet>,
    /// Configured wallets whose key variable was unset, by name
    unloaded: HashMap<String, String>,
}

impl Wallets {
    /// Load every configured wallet whose key is present in the environment
    pub fn from_config(configs: &HashMap<String, WalletConfig>) -> Result<Self> {
        let mut wallets = Self::default();
        for (name, config) in configs {
            if std::env::var(&config.private_key_env).is_err() {
                warn!(
                    "Skipping wallet {}: {} is not set",
                    name, config.private_key_env
                );
                wallets
                    .unloaded
                    .insert(name.clone(), config.private_key_env.clone());
                continue;
            }
            wallets.insert(Wallet::from_config(name, config)?);
        }
        if wallets.wallets.is_empty() {
            bail!("No wallet could be loaded, set the private key environment variables");
        }
        Ok(wallets)
    }

    pub fn insert(&mut self, wallet: Wallet) {
        self.unloaded.remove(&wallet.name);
        self.wallets.insert(wallet.name.clone(), wallet);
    }

    pub fn get(&self, name: &str) -> Result<&Wallet> {
        if let Some(wallet) = self.loaded(name)? {
            return Ok(wallet);
        }
        let fallback = self
            .loaded(DEFAULT_WALLET)?
            .ok_or_else(|| anyhow!("Unknown wallet {} and no default wallet configured", name))?;
        warn!("Unknown wallet {}, using {}", name, DEFAULT_WALLET);
        Ok(fallback)
    }

    /// A configured wallet without its key never resolves to another wallet
    fn loaded(&self, name: &str) -> Result<Option<&Wallet>> {
        if let Some(var) = self.unloaded.get(name) {
            bail!("Wallet {} is configured but {} is not set", name, var);
        }
        Ok(self.wallets.get(name))
    }
}
