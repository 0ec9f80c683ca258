use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DISPLAY_DECIMALS;

// ==================== REMOTE STORE ====================

/// One record of the remote address store. Extra fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub address: String,
}

// ==================== BALANCE ====================

/// Human-readable native balance with fixed 2-digit precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(String);

impl Balance {
    #[cfg(test)]
    pub fn from_decimal(value: Decimal) -> Self {
        let rounded = value.round_dp_with_strategy(
            DISPLAY_DECIMALS,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        );
        Balance(format!("{:.prec$}", rounded, prec = DISPLAY_DECIMALS as usize))
    }

    /// Builds a balance from its whole part and the already rounded
    /// fraction digits.
    pub fn from_parts(whole: impl fmt::Display, fraction: u64) -> Self {
        Balance(format!(
            "{}.{:0width$}",
            whole,
            fraction,
            width = DISPLAY_DECIMALS as usize
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value used for ranking. Unparsable text ranks as zero and
    /// digits too large for a decimal saturate at `Decimal::MAX`.
    pub fn value(&self) -> Decimal {
        match Decimal::from_str(&self.0) {
            Ok(value) => value,
            Err(_) if is_plain_number(&self.0) => Decimal::MAX,
            Err(_) => Decimal::ZERO,
        }
    }
}

fn is_plain_number(text: &str) -> bool {
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==================== LEDGER ENUMS ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

/// Result of `add_address_if_new` / remote reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

// ==================== NOTICES ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Added,
    AlreadyExists,
}

/// Ephemeral, auto-dismissing notice (latest wins).
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub address: String,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
