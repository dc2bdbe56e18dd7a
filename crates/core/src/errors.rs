use thiserror::Error;

use crate::providers::traits::{MediaError, StoreError};

/// Unified error type for the entire expense-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Callers match on the variant; the message is for display and is
/// reported verbatim to the surrounding application.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input / Business Rules ──────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("{0} not found")]
    NotFound(String),

    // ── External Collaborators ──────────────────────────────────────
    #[error("Upstream error: {0}")]
    Upstream(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => CoreError::Upstream(msg),
            StoreError::Conflict { collection, id } => {
                CoreError::Upstream(format!("concurrent write conflict on {collection}/{id}"))
            }
        }
    }
}

impl From<MediaError> for CoreError {
    fn from(e: MediaError) -> Self {
        let MediaError::Upload(msg) = e;
        CoreError::Upstream(msg)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        // A document that fails to round-trip through serde means the
        // store handed back something the models can't represent.
        CoreError::Upstream(format!("malformed stored document: {e}"))
    }
}
