use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::{
    error::{AppError, Result},
    models::{Balance, ConnectionStatus, Notice, NoticeKind, SortDirection},
    services::ranking::{filtered_view, sorted_view},
    utils::{canonical_address, normalize_address},
};

/// In-memory ledger of known addresses and their last-known balances.
///
/// Addresses are stored lower-cased and never duplicated. Every mutation
/// recomputes the sorted view, so readers never observe a stale ordering.
#[derive(Debug)]
pub struct LedgerState {
    known: Vec<String>,
    balances: HashMap<String, Balance>,
    sorted: Vec<String>,
    direction: SortDirection,
    status: ConnectionStatus,
    epoch: u64,
    session_epoch: Option<u64>,
    last_error: Option<String>,
    notice: Option<Notice>,
    notice_ttl: Duration,
}

impl LedgerState {
    pub fn new(notice_ttl_secs: u64) -> Self {
        Self {
            known: Vec::new(),
            balances: HashMap::new(),
            sorted: Vec::new(),
            direction: SortDirection::default(),
            status: ConnectionStatus::default(),
            epoch: 0,
            session_epoch: None,
            last_error: None,
            notice: None,
            notice_ttl: Duration::seconds(notice_ttl_secs as i64),
        }
    }

    // ==================== ADDRESSES ====================

    pub fn contains(&self, address: &str) -> bool {
        let normalized = normalize_address(address);
        self.known.iter().any(|known| *known == normalized)
    }

    /// Set-union of `list` into the known set. Returns the newly inserted
    /// addresses in input order.
    pub fn merge_addresses<I, S>(&mut self, list: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inserted = Vec::new();
        for raw in list {
            let address = normalize_address(raw.as_ref());
            if address.is_empty() || self.known.contains(&address) {
                continue;
            }
            self.known.push(address.clone());
            inserted.push(address);
        }
        if !inserted.is_empty() {
            self.recompute();
        }
        inserted
    }

    /// Validates `raw` and checks it against the local set.
    ///
    /// Returns the canonical address when it is well formed and unknown.
    pub fn check_new(&self, raw: &str) -> Result<String> {
        let address = canonical_address(raw)?;
        if self.contains(&address) {
            return Err(AppError::AlreadyExists(address));
        }
        Ok(address)
    }

    /// Drops `address` from the known set, the sorted view and the balance map.
    pub fn remove_address(&mut self, address: &str) -> bool {
        let normalized = normalize_address(address);
        let before = self.known.len();
        self.known.retain(|known| *known != normalized);
        self.balances.remove(&normalized);
        let removed = self.known.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    pub fn known(&self) -> &[String] {
        &self.known
    }

    // ==================== BALANCES ====================

    /// Upserts a balance; addresses outside the known set are ignored.
    pub fn set_balance(&mut self, address: &str, balance: Balance) -> bool {
        let normalized = normalize_address(address);
        if !self.known.contains(&normalized) {
            return false;
        }
        self.balances.insert(normalized, balance);
        self.recompute();
        true
    }

    /// `set_balance` guarded by the epoch captured when the query started.
    pub fn apply_balance(&mut self, epoch: u64, address: &str, balance: Balance) -> bool {
        if !self.is_current(epoch) {
            tracing::debug!(
                "Discarding stale balance for {} (epoch {} != {})",
                address,
                epoch,
                self.epoch
            );
            return false;
        }
        self.set_balance(address, balance)
    }

    pub fn balance(&self, address: &str) -> Option<&Balance> {
        self.balances.get(&normalize_address(address))
    }

    // ==================== VIEWS ====================

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn toggle_direction(&mut self) -> SortDirection {
        self.direction = self.direction.toggled();
        self.recompute();
        self.direction
    }

    pub fn sorted(&self) -> &[String] {
        &self.sorted
    }

    pub fn view(&self, term: &str) -> Vec<String> {
        filtered_view(&self.sorted, term)
    }

    fn recompute(&mut self) {
        self.sorted = sorted_view(&self.known, &self.balances, self.direction);
    }

    // ==================== SESSION ====================

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn session_epoch(&self) -> Option<u64> {
        self.session_epoch
    }

    /// Marks the wallet session as connected under the current epoch.
    pub fn open_session(&mut self) -> u64 {
        self.status = ConnectionStatus::Connected;
        self.session_epoch = Some(self.epoch);
        self.last_error = None;
        self.epoch
    }

    /// Clears every address, balance and notice and advances the epoch so
    /// in-flight balance queries are discarded on arrival.
    pub fn clear(&mut self) {
        self.known.clear();
        self.balances.clear();
        self.sorted.clear();
        self.epoch += 1;
        self.status = ConnectionStatus::Disconnected;
        self.session_epoch = None;
        self.last_error = None;
        self.notice = None;
    }

    // ==================== USER-FACING MESSAGES ====================

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn post_notice(&mut self, kind: NoticeKind, address: &str, now: DateTime<Utc>) {
        let message = match kind {
            NoticeKind::Added => format!("Address {} added", address),
            NoticeKind::AlreadyExists => format!("Address {} was already added", address),
        };
        self.notice = Some(Notice {
            kind,
            address: address.to_string(),
            message,
            expires_at: now + self.notice_ttl,
        });
    }

    pub fn active_notice(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notice.as_ref().filter(|notice| notice.is_active(now))
    }
}
