pub mod address_store;
pub mod wallet_provider;

pub use address_store::{AddressStore, HttpAddressStore};
pub use wallet_provider::{JsonRpcWalletProvider, WalletProvider};
