use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::providers::traits::MediaFile;

/// Direction of a transaction's effect on its wallet.
///
/// The amount itself is always positive; this variant carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// A single income/expense record, always belonging to exactly one
/// wallet. May be moved to a different wallet by an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,

    /// Owning user id.
    pub uid: String,

    pub wallet_id: Uuid,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Always positive; direction comes from `kind`.
    pub amount: f64,

    /// Spending category. Meaningful (and required) for expenses.
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// User-assigned point in time; may differ from `created`.
    pub date: DateTime<Utc>,

    /// Hosted receipt image URL, if one was uploaded.
    #[serde(default)]
    pub image: Option<String>,

    pub created: DateTime<Utc>,
}

/// Input for creating a transaction. The id is minted on write.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub uid: String,
    pub wallet_id: Uuid,
    pub kind: TransactionKind,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Receipt image to upload before the record is written.
    pub receipt: Option<MediaFile>,
}

/// Full replacement field set for updating a transaction.
///
/// The financial triple (`wallet_id`, `kind`, `amount`) is required on
/// every update; whether the wallet aggregates need reconciling is
/// decided by comparing it against the stored record.
#[derive(Debug, Clone)]
pub struct TransactionUpdate {
    pub wallet_id: Uuid,
    pub kind: TransactionKind,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// New receipt to upload; `None` keeps the existing image.
    pub receipt: Option<MediaFile>,
}
