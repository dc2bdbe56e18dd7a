use std::sync::Arc;

use uuid::Uuid;

use crate::errors::CoreError;
use crate::models;
use crate::models::transaction::TransactionKind;
use crate::models::wallet::{NewWallet, Wallet, WalletUpdate};
use crate::providers::traits::{
    DocumentStore, Fields, Filter, MediaStore, Query, SortDirection, StoreError,
};

use super::WALLETS;

/// Bounded retries for the guarded aggregate write.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Wallet lifecycle plus the aggregate updater.
///
/// Every balance mutation funnels through [`WalletService::mutate_aggregate`]:
/// read the wallet, validate and compute the new aggregate, then write it
/// guarded on the `rev` stamp. A concurrent writer bumps `rev` between our
/// read and write, the guard rejects the stale write, and the loop re-reads
/// and re-validates. This closes the read-then-write lost-update race
/// without changing the observable algorithm.
pub struct WalletService {
    store: Arc<dyn DocumentStore>,
    media: Arc<dyn MediaStore>,
}

impl WalletService {
    pub fn new(store: Arc<dyn DocumentStore>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Create an empty wallet. Uploads the icon first if one is attached.
    pub async fn create_wallet(&self, new: NewWallet) -> Result<Wallet, CoreError> {
        if new.name.trim().is_empty() {
            return Err(CoreError::Validation("wallet name is required".to_string()));
        }
        let image = match &new.icon {
            Some(file) => Some(self.media.upload(file, "wallets").await?),
            None => None,
        };
        let wallet = Wallet::new(new.uid, new.name, image);
        self.store
            .set(WALLETS, &wallet.id.to_string(), models::to_fields(&wallet)?, false)
            .await?;
        Ok(wallet)
    }

    /// Merge display fields only — the aggregate is never written here.
    pub async fn update_wallet(&self, id: Uuid, update: WalletUpdate) -> Result<Wallet, CoreError> {
        let mut wallet = self.get_wallet(id).await?;
        let mut fields = Fields::new();
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(CoreError::Validation("wallet name is required".to_string()));
            }
            fields.insert("name".to_string(), name.clone().into());
            wallet.name = name;
        }
        if let Some(icon) = update.icon {
            let url = self.media.upload(&icon, "wallets").await?;
            fields.insert("image".to_string(), url.clone().into());
            wallet.image = Some(url);
        }
        if !fields.is_empty() {
            self.store.set(WALLETS, &id.to_string(), fields, true).await?;
        }
        Ok(wallet)
    }

    pub async fn get_wallet(&self, id: Uuid) -> Result<Wallet, CoreError> {
        let doc = self
            .store
            .get(WALLETS, &id.to_string())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("wallet {id}")))?;
        Ok(models::from_document(doc)?)
    }

    /// A user's wallets, newest first.
    pub async fn list_wallets(&self, uid: &str) -> Result<Vec<Wallet>, CoreError> {
        let query = Query::new(vec![Filter::eq("uid", uid)])
            .sort_by("created", SortDirection::Desc);
        let docs = self.store.query(WALLETS, query).await?;
        docs.into_iter()
            .map(|doc| models::from_document(doc).map_err(CoreError::from))
            .collect()
    }

    // ── Aggregate updates ───────────────────────────────────────────

    /// Record the effect of a transaction on the wallet's aggregate.
    ///
    /// `amount` is a positive delta; the sign is carried by `kind`.
    /// Fails `InsufficientBalance` when an expense would overdraw,
    /// checked against the freshly read balance on every attempt.
    pub async fn apply_effect(
        &self,
        wallet_id: Uuid,
        kind: TransactionKind,
        amount: f64,
    ) -> Result<Wallet, CoreError> {
        self.mutate_aggregate(wallet_id, |wallet| {
            if !wallet.can_apply(kind, amount) {
                return Err(CoreError::InsufficientBalance(format!(
                    "wallet \"{}\" does not have enough balance",
                    wallet.name
                )));
            }
            Ok(wallet.with_applied(kind, amount))
        })
        .await
    }

    /// Undo a previously recorded effect.
    ///
    /// Reverting an income below what the wallet's expenses have already
    /// consumed fails `InvalidOperation` before anything is written.
    pub async fn revert_effect(
        &self,
        wallet_id: Uuid,
        kind: TransactionKind,
        amount: f64,
    ) -> Result<Wallet, CoreError> {
        self.mutate_aggregate(wallet_id, |wallet| {
            if kind == TransactionKind::Income && wallet.amount - amount < 0.0 {
                return Err(CoreError::InvalidOperation(format!(
                    "reverting this income would overdraw wallet \"{}\"",
                    wallet.name
                )));
            }
            Ok(wallet.with_reverted(kind, amount))
        })
        .await
    }

    /// Same-wallet revert-then-reapply as a single read-validate-write.
    ///
    /// The old effect is undone and the new one recorded in one guarded
    /// write, so no interleaved reader ever observes the reverted-only
    /// state. The new effect is validated against the *reverted* balance
    /// — the revert already freed up capacity.
    pub async fn edit_effect(
        &self,
        wallet_id: Uuid,
        old: (TransactionKind, f64),
        new: (TransactionKind, f64),
    ) -> Result<Wallet, CoreError> {
        let (old_kind, old_amount) = old;
        let (new_kind, new_amount) = new;
        self.mutate_aggregate(wallet_id, |wallet| {
            if old_kind == TransactionKind::Income && wallet.amount - old_amount < 0.0 {
                return Err(CoreError::InvalidOperation(format!(
                    "reverting this income would overdraw wallet \"{}\"",
                    wallet.name
                )));
            }
            let reverted = wallet.with_reverted(old_kind, old_amount);
            if !reverted.can_apply(new_kind, new_amount) {
                return Err(CoreError::InsufficientBalance(format!(
                    "wallet \"{}\" does not have enough balance",
                    wallet.name
                )));
            }
            Ok(reverted.with_applied(new_kind, new_amount))
        })
        .await
    }

    /// Read-validate-write loop for the wallet aggregate, guarded on the
    /// `rev` stamp with bounded retries. Only the changed fields are
    /// merge-written.
    async fn mutate_aggregate<F>(&self, wallet_id: Uuid, compute: F) -> Result<Wallet, CoreError>
    where
        F: Fn(&Wallet) -> Result<Wallet, CoreError>,
    {
        let id = wallet_id.to_string();
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let wallet = self.get_wallet(wallet_id).await?;
            let mut next = compute(&wallet)?;
            next.rev = wallet.rev + 1;

            let mut fields = Fields::new();
            fields.insert("amount".to_string(), next.amount.into());
            fields.insert("totalIncome".to_string(), next.total_income.into());
            fields.insert("totalExpenses".to_string(), next.total_expenses.into());
            fields.insert("rev".to_string(), next.rev.into());

            match self
                .store
                .set_guarded(WALLETS, &id, fields, "rev", wallet.rev.into())
                .await
            {
                Ok(()) => return Ok(next),
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(wallet = %id, attempt, "aggregate write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        tracing::warn!(wallet = %id, "aggregate write attempts exhausted");
        Err(CoreError::Upstream(format!(
            "wallet {wallet_id}: too many concurrent balance updates"
        )))
    }
}
