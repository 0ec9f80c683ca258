use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, U256},
};
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    constants::{DISPLAY_DECIMALS, NATIVE_TOKEN_DECIMALS},
    error::{AppError, Result},
    models::Balance,
};

/// Anything able to answer a raw native-balance query.
#[async_trait::async_trait]
pub trait BalanceSource: Send + Sync {
    async fn raw_balance(&self, address: Address) -> Result<U256>;

    fn label(&self) -> &'static str;
}

/// Formatted balance lookups, one attempt per call.
#[async_trait::async_trait]
pub trait BalanceOracle: Send + Sync {
    async fn get_balance(&self, address: &str) -> Result<Balance>;
}

/// Public chain RPC used when no wallet provider is available.
#[derive(Clone, Debug)]
pub struct RpcBalanceSource {
    provider: Provider<Http>,
}

impl RpcBalanceSource {
    pub fn new(url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| AppError::Internal(format!("Invalid EVM RPC URL: {}", e)))?;
        Ok(Self { provider })
    }
}

#[async_trait::async_trait]
impl BalanceSource for RpcBalanceSource {
    async fn raw_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address, None)
            .await
            .map_err(|e| AppError::Oracle(e.to_string()))
    }

    fn label(&self) -> &'static str {
        "fallback-rpc"
    }
}

/// Prefers the wallet provider when one is configured, otherwise the
/// fallback RPC endpoint. The choice is made on every call.
pub struct ProviderBalanceOracle {
    wallet: Option<Arc<dyn BalanceSource>>,
    fallback: Arc<dyn BalanceSource>,
}

impl ProviderBalanceOracle {
    pub fn new(wallet: Option<Arc<dyn BalanceSource>>, fallback: Arc<dyn BalanceSource>) -> Self {
        Self { wallet, fallback }
    }

    fn source(&self) -> &Arc<dyn BalanceSource> {
        self.wallet.as_ref().unwrap_or(&self.fallback)
    }
}

#[async_trait::async_trait]
impl BalanceOracle for ProviderBalanceOracle {
    async fn get_balance(&self, address: &str) -> Result<Balance> {
        let parsed = Address::from_str(address)
            .map_err(|_| AppError::Oracle(format!("invalid address {}", address)))?;
        let source = self.source();
        let raw = source.raw_balance(parsed).await?;
        let balance = format_balance(raw);
        tracing::debug!("Balance for {} via {}: {}", address, source.label(), balance);
        Ok(balance)
    }
}

/// Converts an 18-decimal fixed-point integer into a 2-digit display balance,
/// rounding half up. Works on the full `U256` range.
pub fn format_balance(raw: U256) -> Balance {
    let step = U256::exp10((NATIVE_TOKEN_DECIMALS - DISPLAY_DECIMALS) as usize);
    let mut cents = raw / step;
    if raw % step >= step / 2 {
        cents += U256::one();
    }
    let scale = U256::exp10(DISPLAY_DECIMALS as usize);
    Balance::from_parts(cents / scale, (cents % scale).as_u64())
}
