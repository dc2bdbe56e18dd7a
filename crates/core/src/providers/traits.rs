use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// The raw field map of a stored document, keyed by wire field name
/// (`walletId`, `totalIncome`, ...).
pub type Fields = Map<String, Value>;

/// A document as returned by the store: its id plus its fields.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Comparison operator for a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

/// A single `(field, op, value)` filter clause.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::Eq, value: value.into() }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::Gte, value: value.into() }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), op: FilterOp::Lte, value: value.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A filtered, optionally sorted and limited query over one collection.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub sort: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters, sort: None, limit: None }
    }

    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Errors surfaced by a [`DocumentStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not complete the request (network, quota, outage).
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// A guarded write found the document changed since it was read.
    #[error("write conflict on {collection}/{id}")]
    Conflict { collection: String, id: String },
}

/// Trait abstraction for the key-value document store the core persists to.
///
/// The store is an external collaborator — the core consumes this
/// interface and never constructs an implementation of its own. Each
/// service receives an `Arc<dyn DocumentStore>` at build time.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document by id. `Ok(None)` when absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Write a document. With `merge` set, only the given fields are
    /// overwritten and the rest of the document is left intact;
    /// otherwise the document is replaced wholesale. Creates the
    /// document if it does not exist.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Merge-write `fields` only if the stored document's `guard_field`
    /// currently equals `expected`. Fails with [`StoreError::Conflict`]
    /// when it does not, and [`StoreError::Unavailable`] when the
    /// document is missing entirely.
    async fn set_guarded(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        guard_field: &str,
        expected: Value,
    ) -> Result<(), StoreError>;

    /// Run a filtered query. Sort and limit are applied by the store.
    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError>;

    /// Delete a set of documents as a single atomic unit. Stores may
    /// cap the batch size; callers page accordingly.
    async fn batch_delete(&self, collection: &str, ids: &[String]) -> Result<(), StoreError>;
}

/// Errors surfaced by a [`MediaStore`] implementation.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media upload failed: {0}")]
    Upload(String),
}

/// An image file handed to the core for upload (receipt, wallet icon).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Trait abstraction for the external media host.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a file into a folder; returns the hosted URL.
    async fn upload(&self, file: &MediaFile, folder: &str) -> Result<String, MediaError>;
}
