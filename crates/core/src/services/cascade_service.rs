use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::providers::traits::{DocumentStore, Fields, Filter, Query};

use super::{TRANSACTIONS, WALLETS, WALLET_DELETIONS};

/// Transactions deleted per batch while draining a wallet's log.
const CASCADE_PAGE: usize = 500;

/// Wallet deletion with cascading removal of its transactions.
///
/// A deletion marker is persisted before the wallet record goes away, so
/// a process that dies mid-cascade leaves a resumable trail instead of
/// silently orphaned transactions. Each page delete is atomic; the
/// cascade as a whole is idempotent and re-runnable.
pub struct CascadeService {
    store: Arc<dyn DocumentStore>,
}

impl CascadeService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Delete a wallet and, in paginated batches, every transaction
    /// referencing it.
    pub async fn delete_wallet(&self, wallet_id: Uuid) -> Result<(), CoreError> {
        let id = wallet_id.to_string();

        let mut marker = Fields::new();
        marker.insert("walletId".to_string(), id.clone().into());
        marker.insert("started".to_string(), serde_json::to_value(Utc::now())?);
        self.store.set(WALLET_DELETIONS, &id, marker, false).await?;

        self.store.batch_delete(WALLETS, std::slice::from_ref(&id)).await?;
        self.drain_transactions(&id).await?;
        self.store.batch_delete(WALLET_DELETIONS, &[id]).await?;
        Ok(())
    }

    /// Finish any cascade a previous process abandoned mid-loop.
    /// Returns the number of markers processed.
    pub async fn resume_pending(&self) -> Result<usize, CoreError> {
        let markers = self.store.query(WALLET_DELETIONS, Query::default()).await?;
        let count = markers.len();
        for marker in markers {
            let wallet_id = marker.id;
            tracing::debug!(wallet = %wallet_id, "resuming interrupted wallet deletion");
            // The wallet record may already be gone; deleting again is a no-op.
            self.store
                .batch_delete(WALLETS, std::slice::from_ref(&wallet_id))
                .await?;
            self.drain_transactions(&wallet_id).await?;
            self.store.batch_delete(WALLET_DELETIONS, &[wallet_id]).await?;
        }
        Ok(count)
    }

    async fn drain_transactions(&self, wallet_id: &str) -> Result<(), CoreError> {
        loop {
            let query = Query::new(vec![Filter::eq("walletId", wallet_id)]).limit(CASCADE_PAGE);
            let page = self.store.query(TRANSACTIONS, query).await?;
            if page.is_empty() {
                break;
            }
            let ids: Vec<String> = page.into_iter().map(|doc| doc.id).collect();
            tracing::debug!(wallet = %wallet_id, count = ids.len(), "deleting transaction page");
            self.store.batch_delete(TRANSACTIONS, &ids).await?;
        }
        Ok(())
    }
}
