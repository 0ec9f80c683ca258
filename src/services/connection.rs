use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::{
    constants::BALANCE_PLACEHOLDER,
    error::{AppError, Result},
    integrations::{address_store::AddressStore, wallet_provider::WalletProvider},
    models::{AddOutcome, Balance, ConnectionStatus, Notice, NoticeKind, SortDirection},
    services::{balance_oracle::BalanceOracle, ledger::LedgerState},
    utils::{canonical_address, normalize_address, short_address},
};

#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub addresses: usize,
    pub balances_resolved: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedRow {
    pub rank: usize,
    pub address: String,
    pub short_address: String,
    pub balance: Option<Balance>,
    pub balance_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingSnapshot {
    pub direction: SortDirection,
    pub rows: Vec<RankedRow>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: ConnectionStatus,
    pub epoch: u64,
    pub known: usize,
    pub last_error: Option<String>,
    pub notice: Option<Notice>,
}

/// Orchestrates the ledger against the remote store, the balance oracle and
/// the wallet provider.
///
/// The ledger lock is never held across a network call. Balance queries
/// capture the ledger epoch before awaiting and are dropped on arrival if a
/// disconnect happened in between. Store reconciliation runs behind
/// `add_gate`, so the existence checks and the append never interleave.
pub struct LedgerService {
    state: RwLock<LedgerState>,
    add_gate: Mutex<()>,
    store: Arc<dyn AddressStore>,
    oracle: Arc<dyn BalanceOracle>,
    wallet: Option<Arc<dyn WalletProvider>>,
}

impl LedgerService {
    pub fn new(
        store: Arc<dyn AddressStore>,
        oracle: Arc<dyn BalanceOracle>,
        wallet: Option<Arc<dyn WalletProvider>>,
        notice_ttl_secs: u64,
    ) -> Self {
        Self {
            state: RwLock::new(LedgerState::new(notice_ttl_secs)),
            add_gate: Mutex::new(()),
            store,
            oracle,
            wallet,
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    // ==================== LOAD / REFRESH ====================

    /// Fetches the remote list, merges it and queries every known address
    /// one after another.
    pub async fn load_from_store(&self) -> Result<RefreshSummary> {
        let epoch = self.state.read().await.epoch();

        let listed = match self.store.list_addresses().await {
            Ok(listed) => listed,
            Err(err) => {
                self.surface(epoch, "Failed to load addresses from store", &err)
                    .await;
                return Err(err);
            }
        };
        let addresses: Vec<String> = listed
            .iter()
            .filter_map(|stored| match canonical_address(stored) {
                Ok(address) => Some(address),
                Err(_) => {
                    tracing::warn!("Skipping malformed store record {:?}", stored);
                    None
                }
            })
            .collect();

        let targets = {
            let mut state = self.state.write().await;
            if !state.is_current(epoch) {
                tracing::debug!("Ledger cleared while loading; dropping store list");
                return Ok(RefreshSummary {
                    addresses: 0,
                    balances_resolved: 0,
                });
            }
            let inserted = state.merge_addresses(&addresses);
            tracing::info!(
                "Loaded {} address(es) from store ({} new)",
                addresses.len(),
                inserted.len()
            );
            state.known().to_vec()
        };

        let balances_resolved = self.refresh_balances(&targets).await;
        Ok(RefreshSummary {
            addresses: addresses.len(),
            balances_resolved,
        })
    }

    /// Single balance query; failures leave the row pending.
    pub async fn refresh_balance(&self, address: &str) -> Result<Balance> {
        let epoch = self.state.read().await.epoch();
        match self.oracle.get_balance(address).await {
            Ok(balance) => {
                self.state
                    .write()
                    .await
                    .apply_balance(epoch, address, balance.clone());
                Ok(balance)
            }
            Err(err) => {
                self.surface(epoch, "Failed to query balance", &err).await;
                Err(err)
            }
        }
    }

    async fn refresh_balances(&self, addresses: &[String]) -> usize {
        let mut resolved = 0;
        for address in addresses {
            if self.refresh_balance(address).await.is_ok() {
                resolved += 1;
            }
        }
        resolved
    }

    // ==================== MANUAL EDITS ====================

    /// Validates, deduplicates against the ledger and the remote store, then
    /// appends to both and queries the new balance.
    pub async fn add_address_if_new(&self, raw: &str) -> Result<AddOutcome> {
        let gate = self.add_gate.lock().await;
        let (address, epoch) = {
            let mut state = self.state.write().await;
            match state.check_new(raw) {
                Ok(address) => {
                    let epoch = state.epoch();
                    (address, epoch)
                }
                Err(AppError::AlreadyExists(address)) => {
                    tracing::info!("Address {} already in ledger", address);
                    state.post_notice(NoticeKind::AlreadyExists, &address, Utc::now());
                    return Ok(AddOutcome::AlreadyExists);
                }
                Err(err) => {
                    tracing::warn!("Rejected address input: {}", err);
                    state.record_error(err.to_string());
                    return Err(err);
                }
            }
        };

        let outcome = self.reconcile_with_store(&address).await?;
        if outcome == AddOutcome::AlreadyExists {
            return Ok(outcome);
        }

        {
            let mut state = self.state.write().await;
            if !state.is_current(epoch) {
                return Ok(outcome);
            }
            state.merge_addresses([&address]);
        }
        drop(gate);

        let _ = self.refresh_balance(&address).await;
        Ok(outcome)
    }

    /// Local-only removal; the remote store is append-only.
    pub async fn remove_address(&self, raw: &str) -> bool {
        let removed = self.state.write().await.remove_address(raw);
        if removed {
            tracing::info!("Removed {} from ledger", normalize_address(raw));
        }
        removed
    }

    pub async fn toggle_sort(&self) -> SortDirection {
        self.state.write().await.toggle_direction()
    }

    // Appends to the store when absent, posts the outcome as a notice and
    // surfaces store errors. Callers hold `add_gate`.
    async fn reconcile_with_store(&self, address: &str) -> Result<AddOutcome> {
        let epoch = self.state.read().await.epoch();
        let result = self.append_if_absent(address).await;
        match &result {
            Ok(outcome) => {
                let kind = match outcome {
                    AddOutcome::Added => NoticeKind::Added,
                    AddOutcome::AlreadyExists => NoticeKind::AlreadyExists,
                };
                let mut state = self.state.write().await;
                if state.is_current(epoch) {
                    state.post_notice(kind, address, Utc::now());
                }
            }
            Err(err) => {
                self.surface(epoch, "Failed to check/add address in store", err)
                    .await
            }
        }
        result
    }

    async fn append_if_absent(&self, address: &str) -> Result<AddOutcome> {
        let listed = self.store.list_addresses().await?;
        let exists = listed
            .iter()
            .any(|stored| canonical_address(stored).is_ok_and(|stored| stored == address));
        if exists {
            tracing::info!("Address {} already exists in store", address);
            return Ok(AddOutcome::AlreadyExists);
        }
        self.store.add_address(address).await?;
        Ok(AddOutcome::Added)
    }

    // ==================== WALLET SESSION ====================

    /// Requests wallet accounts, merges them, reconciles each with the store
    /// and queries its balance.
    pub async fn connect(&self) -> Result<Vec<String>> {
        let epoch = self.state.read().await.epoch();
        let Some(wallet) = self.wallet.clone() else {
            let err = AppError::ProviderUnavailable;
            self.surface(epoch, "Wallet connect failed", &err).await;
            return Err(err);
        };

        let granted = match wallet.request_accounts().await {
            Ok(granted) => granted,
            Err(err) => {
                self.surface(epoch, "Wallet connect failed", &err).await;
                return Err(err);
            }
        };

        let mut accounts: Vec<String> = Vec::with_capacity(granted.len());
        for raw in &granted {
            match canonical_address(raw) {
                Ok(address) if !accounts.contains(&address) => accounts.push(address),
                Ok(_) => {}
                Err(_) => tracing::warn!("Wallet returned malformed account {:?}", raw),
            }
        }

        let session = {
            let mut state = self.state.write().await;
            let session = state.open_session();
            state.merge_addresses(&accounts);
            session
        };
        tracing::info!(
            "Wallet connected with {} account(s) (epoch {})",
            accounts.len(),
            session
        );

        for account in &accounts {
            if !self.state.read().await.is_current(session) {
                tracing::debug!("Wallet disconnected mid-reconciliation");
                break;
            }
            {
                let _gate = self.add_gate.lock().await;
                let _ = self.reconcile_with_store(account).await;
            }
            let _ = self.refresh_balance(account).await;
        }

        Ok(accounts)
    }

    /// Clears the ledger and asks the wallet to drop granted permissions.
    /// A failed permission reset is logged only.
    pub async fn disconnect(&self) -> ConnectionStatus {
        let status = {
            let mut state = self.state.write().await;
            state.clear();
            state.status()
        };

        if let Some(wallet) = &self.wallet {
            match wallet.reset_permissions().await {
                Ok(()) => tracing::info!("Wallet permissions reset"),
                Err(err) => tracing::warn!("Wallet permission reset failed: {}", err),
            }
        }
        status
    }

    // ==================== READ SIDE ====================

    pub async fn ranking(&self, term: &str) -> RankingSnapshot {
        let state = self.state.read().await;
        let rows = state
            .view(term)
            .into_iter()
            .enumerate()
            .map(|(index, address)| {
                let balance = state.balance(&address).cloned();
                let balance_display = balance
                    .as_ref()
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| BALANCE_PLACEHOLDER.to_string());
                RankedRow {
                    rank: index + 1,
                    short_address: short_address(&address),
                    address,
                    balance,
                    balance_display,
                }
            })
            .collect();

        RankingSnapshot {
            direction: state.direction(),
            rows,
            total: state.known().len(),
        }
    }

    pub async fn status(&self) -> StatusSnapshot {
        let state = self.state.read().await;
        StatusSnapshot {
            status: state.status(),
            epoch: state.epoch(),
            known: state.known().len(),
            last_error: state.last_error().map(str::to_string),
            notice: state.active_notice(Utc::now()).cloned(),
        }
    }

    // Logs the failure and makes it the user-visible error unless the
    // ledger was cleared since `epoch`.
    async fn surface(&self, epoch: u64, context: &str, err: &AppError) {
        tracing::warn!("{}: {}", context, err);
        let mut state = self.state.write().await;
        if state.is_current(epoch) {
            state.record_error(err.to_string());
        }
    }
}
