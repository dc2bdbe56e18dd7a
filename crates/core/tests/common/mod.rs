#![allow(dead_code)]

// Shared test doubles: an in-memory DocumentStore with the filtered
// query / guarded write semantics the core relies on, and media hosts
// that succeed or fail on demand.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use expense_tracker_core::models::transaction::{
    NewTransaction, Transaction, TransactionKind, TransactionUpdate,
};
use expense_tracker_core::models::wallet::NewWallet;
use expense_tracker_core::providers::traits::{
    Document, DocumentStore, Fields, FilterOp, MediaError, MediaFile, MediaStore, Query,
    SortDirection, StoreError,
};
use expense_tracker_core::ExpenseTracker;

// ═══════════════════════════════════════════════════════════════════
// In-memory DocumentStore
// ═══════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Fields>>>,
    /// When set, every write fails with `StoreError::Unavailable`.
    pub fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a raw document, bypassing the write-failure switch.
    pub fn seed(&self, collection: &str, id: &str, fields: Fields) {
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub fn doc_count(&self, collection: &str) -> usize {
        let collections = self.collections.lock().unwrap();
        collections.get(collection).map_or(0, BTreeMap::len)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

/// Order two field values the way the backing store would: numbers
/// numerically, timestamps as instants, everything else as strings.
fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
        return a.partial_cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_str(), b.as_str()) {
        let parsed = (
            DateTime::parse_from_rfc3339(a),
            DateTime::parse_from_rfc3339(b),
        );
        if let (Ok(a), Ok(b)) = parsed {
            return Some(a.cmp(&b));
        }
        return Some(a.cmp(b));
    }
    None
}

fn matches(fields: &Fields, query: &Query) -> bool {
    query.filters.iter().all(|filter| {
        let Some(actual) = fields.get(&filter.field) else {
            return false;
        };
        match filter.op {
            FilterOp::Eq => actual == &filter.value,
            FilterOp::Gte => matches!(
                compare(actual, &filter.value),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                compare(actual, &filter.value),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
        }
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document { id: id.to_string(), fields: fields.clone() }))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection.to_string()).or_default();
        if merge {
            docs.entry(id.to_string()).or_default().extend(fields);
        } else {
            docs.insert(id.to_string(), fields);
        }
        Ok(())
    }

    async fn set_guarded(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        guard_field: &str,
        expected: Value,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::Unavailable(format!("{collection}/{id} missing")))?;
        if doc.get(guard_field) != Some(&expected) {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        doc.extend(fields);
        Ok(())
    }

    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock().unwrap();
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| matches(fields, &query))
                    .map(|(id, fields)| Document { id: id.clone(), fields: fields.clone() })
                    .collect()
            })
            .unwrap_or_default();
        if let Some((field, direction)) = &query.sort {
            docs.sort_by(|a, b| {
                let ordering = match (a.fields.get(field), b.fields.get(field)) {
                    (Some(a), Some(b)) => compare(a, b).unwrap_or(std::cmp::Ordering::Equal),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn batch_delete(&self, collection: &str, ids: &[String]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut collections = self.collections.lock().unwrap();
        if let Some(docs) = collections.get_mut(collection) {
            for id in ids {
                docs.remove(id);
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════
// Media hosts
// ═══════════════════════════════════════════════════════════════════

/// Uploads always succeed, returning a deterministic URL.
pub struct MemoryMedia;

#[async_trait]
impl MediaStore for MemoryMedia {
    async fn upload(&self, file: &MediaFile, folder: &str) -> Result<String, MediaError> {
        Ok(format!("https://media.local/{folder}/{}", file.name))
    }
}

/// Uploads always fail.
pub struct FailingMedia;

#[async_trait]
impl MediaStore for FailingMedia {
    async fn upload(&self, _file: &MediaFile, _folder: &str) -> Result<String, MediaError> {
        Err(MediaError::Upload("media host rejected the file".into()))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Builders
// ═══════════════════════════════════════════════════════════════════

pub fn tracker(store: &Arc<MemoryStore>) -> ExpenseTracker {
    ExpenseTracker::new(store.clone(), Arc::new(MemoryMedia))
}

pub fn tracker_with_media(
    store: &Arc<MemoryStore>,
    media: Arc<dyn MediaStore>,
) -> ExpenseTracker {
    ExpenseTracker::new(store.clone(), media)
}

pub fn new_wallet(uid: &str, name: &str) -> NewWallet {
    NewWallet { uid: uid.to_string(), name: name.to_string(), icon: None }
}

pub fn income(uid: &str, wallet_id: Uuid, amount: f64) -> NewTransaction {
    NewTransaction {
        uid: uid.to_string(),
        wallet_id,
        kind: TransactionKind::Income,
        amount,
        date: Utc::now(),
        category: None,
        description: None,
        receipt: None,
    }
}

pub fn expense(uid: &str, wallet_id: Uuid, amount: f64) -> NewTransaction {
    NewTransaction {
        uid: uid.to_string(),
        wallet_id,
        kind: TransactionKind::Expense,
        amount,
        date: Utc::now(),
        category: Some("general".to_string()),
        description: None,
        receipt: None,
    }
}

pub fn at(mut tx: NewTransaction, date: DateTime<Utc>) -> NewTransaction {
    tx.date = date;
    tx
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn receipt() -> MediaFile {
    MediaFile { name: "receipt.jpg".to_string(), bytes: vec![0xff, 0xd8, 0xff] }
}

/// An update that changes nothing, as a starting point for tests.
pub fn update_of(tx: &Transaction) -> TransactionUpdate {
    TransactionUpdate {
        wallet_id: tx.wallet_id,
        kind: tx.kind,
        amount: tx.amount,
        date: tx.date,
        category: tx.category.clone(),
        description: tx.description.clone(),
        receipt: None,
    }
}
