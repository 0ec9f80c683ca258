// In-memory collaborators for service and API tests

use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::{
    error::{AppError, Result},
    integrations::{address_store::AddressStore, wallet_provider::WalletProvider},
    models::Balance,
    services::balance_oracle::{BalanceOracle, BalanceSource},
};

pub struct StaticSource {
    label: &'static str,
    units: u64,
}

impl StaticSource {
    pub fn new(label: &'static str, units: u64) -> Self {
        Self { label, units }
    }
}

#[async_trait::async_trait]
impl BalanceSource for StaticSource {
    async fn raw_balance(&self, _address: Address) -> Result<U256> {
        Ok(U256::from(self.units) * U256::exp10(18))
    }

    fn label(&self) -> &'static str {
        self.label
    }
}

/// Append-only store; every call yields once so concurrent callers interleave.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<String>>,
    posts: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryStore {
    pub fn with_records(records: &[&str]) -> Self {
        Self {
            records: Mutex::new(records.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn posts(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<String> {
        self.records.lock().expect("store lock").clone()
    }
}

#[async_trait::async_trait]
impl AddressStore for InMemoryStore {
    async fn list_addresses(&self) -> Result<Vec<String>> {
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Network("store offline".to_string()));
        }
        Ok(self.records())
    }

    async fn add_address(&self, address: &str) -> Result<()> {
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Network("store offline".to_string()));
        }
        self.records
            .lock()
            .expect("store lock")
            .push(address.to_string());
        self.posts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Oracle answering from a fixed table; unknown addresses hold zero.
#[derive(Default)]
pub struct ScriptedOracle {
    balances: HashMap<String, Balance>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, address: &str, cents: i64) -> Self {
        self.balances.insert(
            address.to_string(),
            Balance::from_decimal(Decimal::new(cents, 2)),
        );
        self
    }

    pub fn failing_for(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait::async_trait]
impl BalanceOracle for ScriptedOracle {
    async fn get_balance(&self, address: &str) -> Result<Balance> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(address.to_string());
        if self.failing.contains(address) {
            return Err(AppError::Oracle(format!("rpc unreachable for {}", address)));
        }
        Ok(self
            .balances
            .get(address)
            .cloned()
            .unwrap_or_else(|| Balance::from_decimal(Decimal::ZERO)))
    }
}

/// Oracle that parks every query until `release` is called.
#[derive(Default)]
pub struct GatedOracle {
    pub started: Notify,
    pub release: Notify,
}

#[async_trait::async_trait]
impl BalanceOracle for GatedOracle {
    async fn get_balance(&self, _address: &str) -> Result<Balance> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(Balance::from_decimal(Decimal::new(4200, 2)))
    }
}

pub enum WalletMode {
    Grant(Vec<String>),
    Reject,
    Broken,
}

pub struct FakeWallet {
    mode: WalletMode,
    reset_fails: bool,
    resets: AtomicUsize,
}

impl FakeWallet {
    pub fn granting(accounts: &[&str]) -> Self {
        Self::new(WalletMode::Grant(
            accounts.iter().map(|a| a.to_string()).collect(),
        ))
    }

    pub fn new(mode: WalletMode) -> Self {
        Self {
            mode,
            reset_fails: false,
            resets: AtomicUsize::new(0),
        }
    }

    pub fn with_failing_reset(mut self) -> Self {
        self.reset_fails = true;
        self
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        match &self.mode {
            WalletMode::Grant(accounts) => Ok(accounts.clone()),
            WalletMode::Reject => Err(AppError::UserRejected(
                "User rejected the request.".to_string(),
            )),
            WalletMode::Broken => Err(AppError::Provider("wallet crashed".to_string())),
        }
    }

    async fn reset_permissions(&self) -> Result<()> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        if self.reset_fails {
            return Err(AppError::Provider("permissions request failed".to_string()));
        }
        Ok(())
    }
}
