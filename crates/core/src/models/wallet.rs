use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::TransactionKind;
use crate::providers::traits::MediaFile;

/// A wallet and its cached balance aggregate.
///
/// The aggregate (`amount`, `total_income`, `total_expenses`) is stored
/// with the wallet so reads never recompute from the transaction log.
/// Between operations `amount == total_income - total_expenses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: Uuid,

    /// Owning user id.
    pub uid: String,

    pub name: String,

    /// Hosted icon URL, if one was uploaded.
    #[serde(default)]
    pub image: Option<String>,

    /// Current balance.
    pub amount: f64,

    /// Cumulative income ever recorded. Non-negative.
    pub total_income: f64,

    /// Cumulative expenses ever recorded. Non-negative.
    pub total_expenses: f64,

    pub created: DateTime<Utc>,

    /// Write stamp bumped on every aggregate write; aggregate writes
    /// are guarded on it so interleaved writers cannot lose updates.
    #[serde(default)]
    pub rev: u64,
}

impl Wallet {
    /// A freshly created wallet starts empty.
    pub fn new(uid: impl Into<String>, name: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            uid: uid.into(),
            name: name.into(),
            image,
            amount: 0.0,
            total_income: 0.0,
            total_expenses: 0.0,
            created: Utc::now(),
            rev: 0,
        }
    }

    /// Whether an effect of `kind` for `amount` may be recorded without
    /// overdrawing the balance. Income is always permitted; an expense
    /// of `a` against balance `b` only when `b - a >= 0`.
    ///
    /// Advisory at the single-read level — the aggregate writer re-runs
    /// this against freshly read state under its write guard.
    #[must_use]
    pub fn can_apply(&self, kind: TransactionKind, amount: f64) -> bool {
        match kind {
            TransactionKind::Income => true,
            TransactionKind::Expense => self.amount - amount >= 0.0,
        }
    }

    /// The aggregate after recording an effect. `amount` is positive;
    /// the variant decides which total moves.
    #[must_use]
    pub fn with_applied(&self, kind: TransactionKind, amount: f64) -> Wallet {
        let mut next = self.clone();
        match kind {
            TransactionKind::Income => {
                next.amount += amount;
                next.total_income += amount;
            }
            TransactionKind::Expense => {
                next.amount -= amount;
                next.total_expenses += amount;
            }
        }
        next
    }

    /// The aggregate as if a previously recorded effect never happened.
    /// Exact inverse of [`Wallet::with_applied`].
    #[must_use]
    pub fn with_reverted(&self, kind: TransactionKind, amount: f64) -> Wallet {
        let mut next = self.clone();
        match kind {
            TransactionKind::Income => {
                next.amount -= amount;
                next.total_income -= amount;
            }
            TransactionKind::Expense => {
                next.amount += amount;
                next.total_expenses -= amount;
            }
        }
        next
    }
}

/// Input for creating a wallet.
#[derive(Debug, Clone)]
pub struct NewWallet {
    pub uid: String,
    pub name: String,
    /// Icon image to upload before the record is written.
    pub icon: Option<MediaFile>,
}

/// Display-field patch for an existing wallet. Aggregates are never
/// touched through this path.
#[derive(Debug, Clone, Default)]
pub struct WalletUpdate {
    pub name: Option<String>,
    pub icon: Option<MediaFile>,
}
