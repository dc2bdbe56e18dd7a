pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use errors::CoreError;
use models::stats::StatsReport;
use models::transaction::{NewTransaction, Transaction, TransactionUpdate};
use models::wallet::{NewWallet, Wallet, WalletUpdate};
use providers::traits::{DocumentStore, MediaStore};
use services::cascade_service::CascadeService;
use services::stats_service::StatsService;
use services::transaction_service::TransactionService;
use services::wallet_service::WalletService;

/// Main entry point for the Expense Tracker core library.
///
/// Holds the services, each bound to the injected document store and
/// media host. The store and media host are external collaborators —
/// the surrounding application decides what actually backs them.
#[must_use]
pub struct ExpenseTracker {
    wallet_service: WalletService,
    transaction_service: TransactionService,
    cascade_service: CascadeService,
    stats_service: StatsService,
}

impl ExpenseTracker {
    pub fn new(store: Arc<dyn DocumentStore>, media: Arc<dyn MediaStore>) -> Self {
        Self {
            wallet_service: WalletService::new(store.clone(), media.clone()),
            transaction_service: TransactionService::new(store.clone(), media),
            cascade_service: CascadeService::new(store.clone()),
            stats_service: StatsService::new(store),
        }
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Record a new transaction, applying its effect to the wallet.
    pub async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction, CoreError> {
        self.transaction_service.create(new).await
    }

    /// Rewrite an existing transaction. Changes to its amount, kind, or
    /// wallet reconcile the affected wallet aggregates.
    pub async fn update_transaction(
        &self,
        id: Uuid,
        update: TransactionUpdate,
    ) -> Result<Transaction, CoreError> {
        self.transaction_service.update(id, update).await
    }

    /// Delete a transaction, undoing its effect on the wallet.
    pub async fn delete_transaction(&self, id: Uuid, wallet_id: Uuid) -> Result<(), CoreError> {
        self.transaction_service.delete(id, wallet_id).await
    }

    /// Fetch a single transaction by id.
    pub async fn get_transaction(&self, id: Uuid) -> Result<Transaction, CoreError> {
        self.transaction_service.get(id).await
    }

    /// A user's most recent transactions, newest first.
    pub async fn recent_transactions(
        &self,
        uid: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.transaction_service.recent(uid, limit).await
    }

    // ── Wallets ─────────────────────────────────────────────────────

    /// Create an empty wallet (balance and totals start at zero).
    pub async fn create_wallet(&self, new: NewWallet) -> Result<Wallet, CoreError> {
        self.wallet_service.create_wallet(new).await
    }

    /// Update a wallet's display fields (name, icon).
    pub async fn update_wallet(&self, id: Uuid, update: WalletUpdate) -> Result<Wallet, CoreError> {
        self.wallet_service.update_wallet(id, update).await
    }

    /// Fetch a single wallet by id.
    pub async fn get_wallet(&self, id: Uuid) -> Result<Wallet, CoreError> {
        self.wallet_service.get_wallet(id).await
    }

    /// A user's wallets, newest first.
    pub async fn list_wallets(&self, uid: &str) -> Result<Vec<Wallet>, CoreError> {
        self.wallet_service.list_wallets(uid).await
    }

    /// Delete a wallet and cascade-delete its transactions.
    pub async fn delete_wallet(&self, wallet_id: Uuid) -> Result<(), CoreError> {
        self.cascade_service.delete_wallet(wallet_id).await
    }

    /// Finish wallet deletions a previous process abandoned mid-cascade.
    /// Returns the number of pending deletions processed.
    pub async fn resume_pending_deletions(&self) -> Result<usize, CoreError> {
        self.cascade_service.resume_pending().await
    }

    // ── Stats ───────────────────────────────────────────────────────

    /// Income/expense series for the last 7 days.
    pub async fn weekly_stats(&self, uid: &str) -> Result<StatsReport, CoreError> {
        self.stats_service.weekly(uid, Utc::now()).await
    }

    /// Income/expense series for the last 12 months.
    pub async fn monthly_stats(&self, uid: &str) -> Result<StatsReport, CoreError> {
        self.stats_service.monthly(uid, Utc::now()).await
    }

    /// Income/expense series for every year since the user's first
    /// transaction.
    pub async fn yearly_stats(&self, uid: &str) -> Result<StatsReport, CoreError> {
        self.stats_service.yearly(uid, Utc::now()).await
    }
}
