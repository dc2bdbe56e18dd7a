use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models;
use crate::models::transaction::{NewTransaction, Transaction, TransactionKind, TransactionUpdate};
use crate::providers::traits::{DocumentStore, Filter, MediaStore, Query, SortDirection};

use super::wallet_service::WalletService;
use super::TRANSACTIONS;

/// Create / update / delete of single transaction records, keeping the
/// owning wallet aggregate(s) correct throughout.
///
/// Edits that change the financial triple (kind, amount, wallet) run the
/// revert-then-reapply algorithm: undo the old effect on the old wallet,
/// validate the new effect, record it on the target wallet, then persist
/// the record. Wallet writes always complete before the record write so
/// a crash leaves the aggregate consistent with the record that still
/// exists.
pub struct TransactionService {
    store: Arc<dyn DocumentStore>,
    media: Arc<dyn MediaStore>,
    wallets: WalletService,
}

impl TransactionService {
    pub fn new(store: Arc<dyn DocumentStore>, media: Arc<dyn MediaStore>) -> Self {
        let wallets = WalletService::new(store.clone(), media.clone());
        Self { store, media, wallets }
    }

    /// Record a new transaction and apply its effect to the wallet.
    pub async fn create(&self, new: NewTransaction) -> Result<Transaction, CoreError> {
        validate_financials(new.kind, new.amount, new.category.as_deref())?;

        // The wallet effect commits first; the balance check runs inside
        // the guarded aggregate write against freshly read state.
        self.wallets
            .apply_effect(new.wallet_id, new.kind, new.amount)
            .await?;

        let image = match &new.receipt {
            Some(file) => match self.media.upload(file, "transactions").await {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::error!(wallet = %new.wallet_id, "receipt upload failed after wallet update: {e}");
                    return Err(e.into());
                }
            },
            None => None,
        };

        let tx = Transaction {
            id: Uuid::new_v4(),
            uid: new.uid,
            wallet_id: new.wallet_id,
            kind: new.kind,
            amount: new.amount,
            category: new.category,
            description: new.description,
            date: new.date,
            image,
            created: Utc::now(),
        };
        if let Err(e) = self
            .store
            .set(TRANSACTIONS, &tx.id.to_string(), models::to_fields(&tx)?, true)
            .await
        {
            tracing::error!(transaction = %tx.id, "record write failed after wallet update: {e}");
            return Err(e.into());
        }
        Ok(tx)
    }

    /// Rewrite a transaction, reconciling wallet aggregates when its
    /// kind, amount, or wallet changed.
    pub async fn update(&self, id: Uuid, update: TransactionUpdate) -> Result<Transaction, CoreError> {
        validate_financials(update.kind, update.amount, update.category.as_deref())?;
        let old = self.get(id).await?;

        let changed = old.kind != update.kind
            || old.amount != update.amount
            || old.wallet_id != update.wallet_id;
        if changed {
            self.reconcile_wallets(&old, &update).await?;
        }

        let image = match &update.receipt {
            Some(file) => Some(self.media.upload(file, "transactions").await?),
            None => old.image.clone(),
        };

        let tx = Transaction {
            id,
            uid: old.uid,
            wallet_id: update.wallet_id,
            kind: update.kind,
            amount: update.amount,
            category: update.category,
            description: update.description,
            date: update.date,
            image,
            created: old.created,
        };
        self.store
            .set(TRANSACTIONS, &id.to_string(), models::to_fields(&tx)?, true)
            .await?;
        Ok(tx)
    }

    /// Delete a transaction, undoing its effect on the wallet.
    ///
    /// The wallet is reverted first and the record deleted after, so a
    /// crash in between leaves the aggregate consistent with a record
    /// that still exists.
    pub async fn delete(&self, id: Uuid, wallet_id: Uuid) -> Result<(), CoreError> {
        let tx = self.get(id).await?;

        if let Err(e) = self.wallets.revert_effect(wallet_id, tx.kind, tx.amount).await {
            return Err(match e {
                CoreError::InvalidOperation(msg) => {
                    CoreError::InvalidOperation(format!("cannot delete this transaction: {msg}"))
                }
                other => other,
            });
        }

        self.store
            .batch_delete(TRANSACTIONS, &[id.to_string()])
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Transaction, CoreError> {
        let doc = self
            .store
            .get(TRANSACTIONS, &id.to_string())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("transaction {id}")))?;
        Ok(models::from_document(doc)?)
    }

    /// A user's most recent transactions, newest first.
    pub async fn recent(&self, uid: &str, limit: usize) -> Result<Vec<Transaction>, CoreError> {
        let query = Query::new(vec![Filter::eq("uid", uid)])
            .sort_by("date", SortDirection::Desc)
            .limit(limit);
        let docs = self.store.query(TRANSACTIONS, query).await?;
        docs.into_iter()
            .map(|doc| models::from_document(doc).map_err(CoreError::from))
            .collect()
    }

    /// Revert the old effect and apply the new one.
    ///
    /// Same wallet: one combined guarded write, validated against the
    /// reverted balance. Cross-wallet move: both sides are validated
    /// before any write, then revert commits on the source wallet and
    /// the new effect on the target (each re-validated under its guard).
    async fn reconcile_wallets(
        &self,
        old: &Transaction,
        update: &TransactionUpdate,
    ) -> Result<(), CoreError> {
        if old.wallet_id == update.wallet_id {
            self.wallets
                .edit_effect(
                    old.wallet_id,
                    (old.kind, old.amount),
                    (update.kind, update.amount),
                )
                .await?;
            return Ok(());
        }

        let source = self.wallets.get_wallet(old.wallet_id).await?;
        let target = self.wallets.get_wallet(update.wallet_id).await?;

        if old.kind == TransactionKind::Income && source.amount - old.amount < 0.0 {
            return Err(CoreError::InvalidOperation(format!(
                "wallet \"{}\" has expenses recorded against this income; moving it would overdraw the balance",
                source.name
            )));
        }
        if !target.can_apply(update.kind, update.amount) {
            return Err(CoreError::InsufficientBalance(format!(
                "wallet \"{}\" does not have enough balance",
                target.name
            )));
        }

        self.wallets
            .revert_effect(old.wallet_id, old.kind, old.amount)
            .await?;
        self.wallets
            .apply_effect(update.wallet_id, update.kind, update.amount)
            .await?;
        Ok(())
    }
}

/// Shared create/update validation: positive amount, category on expenses.
fn validate_financials(
    kind: TransactionKind,
    amount: f64,
    category: Option<&str>,
) -> Result<(), CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation(
            "transaction amount must be positive".to_string(),
        ));
    }
    if kind == TransactionKind::Expense && category.map_or(true, |c| c.trim().is_empty()) {
        return Err(CoreError::Validation(
            "expense transactions require a category".to_string(),
        ));
    }
    Ok(())
}
