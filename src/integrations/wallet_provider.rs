use ethers::{
    providers::{Http, Middleware, Provider, ProviderError, RpcError},
    types::{Address, U256},
};
use serde_json::json;

use crate::{
    constants::{METHOD_REQUEST_ACCOUNTS, METHOD_REQUEST_PERMISSIONS, USER_REJECTED_CODE},
    error::{AppError, Result},
    services::balance_oracle::BalanceSource,
};

/// Account-access side of a wallet provider (EIP-1193 style).
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`: addresses the user granted access to.
    async fn request_accounts(&self) -> Result<Vec<String>>;

    /// `wallet_requestPermissions` for `eth_accounts`, used as a permission reset.
    async fn reset_permissions(&self) -> Result<()>;
}

/// Wallet provider reached over JSON-RPC (`WALLET_RPC_URL`).
#[derive(Clone, Debug)]
pub struct JsonRpcWalletProvider {
    provider: Provider<Http>,
}

impl JsonRpcWalletProvider {
    pub fn new(url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| AppError::Internal(format!("Invalid wallet RPC URL: {}", e)))?;
        Ok(Self { provider })
    }
}

#[async_trait::async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        let accounts: Vec<String> = self
            .provider
            .request(METHOD_REQUEST_ACCOUNTS, ())
            .await
            .map_err(map_wallet_error)?;
        tracing::debug!("Wallet granted {} account(s)", accounts.len());
        Ok(accounts)
    }

    async fn reset_permissions(&self) -> Result<()> {
        let params = [json!({ "eth_accounts": {} })];
        let _: serde_json::Value = self
            .provider
            .request(METHOD_REQUEST_PERMISSIONS, params)
            .await
            .map_err(map_wallet_error)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl BalanceSource for JsonRpcWalletProvider {
    async fn raw_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address, None)
            .await
            .map_err(|e| AppError::Oracle(e.to_string()))
    }

    fn label(&self) -> &'static str {
        "wallet"
    }
}

/// Maps a JSON-RPC failure onto the wallet error kinds.
pub(crate) fn map_wallet_error(err: ProviderError) -> AppError {
    match err.as_error_response() {
        Some(response) => classify_rpc_error(response.code, &response.message),
        None => AppError::Provider(err.to_string()),
    }
}

// Internal helper that supports `classify_rpc_error` operations.
fn classify_rpc_error(code: i64, message: &str) -> AppError {
    if code == USER_REJECTED_CODE {
        AppError::UserRejected(message.to_string())
    } else {
        AppError::Provider(format!("{} (code {})", message, code))
    }
}
