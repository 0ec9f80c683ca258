// src/api/mod.rs

pub mod accounts;
pub mod connection;
pub mod health;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::integrations::{HttpAddressStore, JsonRpcWalletProvider, WalletProvider};
use crate::services::{BalanceSource, LedgerService, ProviderBalanceOracle, RpcBalanceSource};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService>,
    pub config: Config,
}

impl AppState {
    /// Wires the HTTP store, the chain RPC clients and the optional wallet
    /// provider into a single ledger service.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = Arc::new(HttpAddressStore::new(config.address_store_url.clone()));
        let fallback: Arc<dyn BalanceSource> =
            Arc::new(RpcBalanceSource::new(&config.fallback_rpc_url)?);

        let wallet = match &config.wallet_rpc_url {
            Some(url) => Some(Arc::new(JsonRpcWalletProvider::new(url)?)),
            None => None,
        };
        let wallet_source = wallet
            .clone()
            .map(|provider| provider as Arc<dyn BalanceSource>);
        let wallet_provider = wallet.map(|provider| provider as Arc<dyn WalletProvider>);

        let oracle = Arc::new(ProviderBalanceOracle::new(wallet_source, fallback));
        let service = LedgerService::new(store, oracle, wallet_provider, config.notice_ttl_secs);

        tracing::info!("Address store: {}", config.address_store_url);
        tracing::info!(
            "Balance oracle: {}",
            if service.has_wallet() {
                "wallet provider"
            } else {
                "fallback RPC"
            }
        );

        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn from_config_without_wallet_uses_fallback_only() {
        let state = AppState::from_config(test_config()).expect("state");
        assert!(!state.service.has_wallet());
    }

    #[test]
    fn from_config_with_wallet_enables_connect() {
        let config = Config {
            wallet_rpc_url: Some("http://localhost:1248".to_string()),
            ..test_config()
        };
        let state = AppState::from_config(config).expect("state");
        assert!(state.service.has_wallet());
    }
}
