pub mod cascade_service;
pub mod stats_service;
pub mod transaction_service;
pub mod wallet_service;

/// Collection names in the document store.
pub(crate) const WALLETS: &str = "wallets";
pub(crate) const TRANSACTIONS: &str = "transactions";
pub(crate) const WALLET_DELETIONS: &str = "walletDeletions";
