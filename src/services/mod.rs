// Ledger services
pub mod balance_oracle;
pub mod connection;
pub mod ledger;
pub mod ranking;

#[cfg(test)]
pub(crate) mod testing;

// Re-export for convenience
pub use balance_oracle::{BalanceOracle, BalanceSource, ProviderBalanceOracle, RpcBalanceSource};
pub use connection::LedgerService;
pub use ledger::LedgerState;
