use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::errors::CoreError;
use crate::models;
use crate::models::stats::{ChartPoint, StatsReport};
use crate::models::transaction::{Transaction, TransactionKind};
use crate::providers::traits::{DocumentStore, Filter, Query, SortDirection};

use super::TRANSACTIONS;

/// Read-only time-bucketed aggregation over the transaction log.
///
/// All three horizons share one shape: materialize the full fixed
/// calendar bucket sequence up front (zero-filled, so gaps are visible),
/// fetch the user's transactions in the covering range sorted by date
/// descending, fold each into its bucket by exact calendar key, and emit
/// per bucket a labeled income point followed by an unlabeled expense
/// point. The current instant is a parameter so the fold stays
/// deterministic under test.
pub struct StatsService {
    store: Arc<dyn DocumentStore>,
}

/// One calendar interval being accumulated into.
struct Bucket {
    key: String,
    label: String,
    income: f64,
    expense: f64,
}

impl Bucket {
    fn new(key: String, label: String) -> Self {
        Self { key, label, income: 0.0, expense: 0.0 }
    }
}

impl StatsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Daily buckets for the last 7 days ending at `now`, labeled with
    /// the short weekday name.
    pub async fn weekly(&self, uid: &str, now: DateTime<Utc>) -> Result<StatsReport, CoreError> {
        let transactions = self
            .fetch_range(uid, Some(now - Duration::days(7)), Some(now))
            .await?;
        let mut buckets = last_seven_days(now.date_naive());
        fold(&mut buckets, &transactions, |tx| {
            tx.date.date_naive().format("%Y-%m-%d").to_string()
        });
        Ok(report(buckets, transactions))
    }

    /// Monthly buckets for the last 12 calendar months ending with the
    /// current month, keyed and labeled `"%b %y"` (e.g. `Jan 25`).
    pub async fn monthly(&self, uid: &str, now: DateTime<Utc>) -> Result<StatsReport, CoreError> {
        let transactions = self
            .fetch_range(uid, Some(now - Months::new(12)), Some(now))
            .await?;
        let mut buckets = last_twelve_months(now.date_naive());
        fold(&mut buckets, &transactions, |tx| {
            tx.date.format("%b %y").to_string()
        });
        Ok(report(buckets, transactions))
    }

    /// Yearly buckets from the user's earliest transaction (the current
    /// year when there are none) through the current year.
    pub async fn yearly(&self, uid: &str, now: DateTime<Utc>) -> Result<StatsReport, CoreError> {
        let transactions = self.fetch_range(uid, None, None).await?;
        let current_year = now.year();
        let first_year = transactions
            .iter()
            .map(|tx| tx.date.year())
            .min()
            .unwrap_or(current_year)
            .min(current_year);
        let mut buckets = (first_year..=current_year)
            .map(|year| Bucket::new(year.to_string(), year.to_string()))
            .collect();
        fold(&mut buckets, &transactions, |tx| tx.date.year().to_string());
        Ok(report(buckets, transactions))
    }

    async fn fetch_range(
        &self,
        uid: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>, CoreError> {
        let mut filters = vec![Filter::eq("uid", uid)];
        if let Some(from) = from {
            filters.push(Filter::gte("date", serde_json::to_value(from)?));
        }
        if let Some(to) = to {
            filters.push(Filter::lte("date", serde_json::to_value(to)?));
        }
        let query = Query::new(filters).sort_by("date", SortDirection::Desc);
        let docs = self.store.query(TRANSACTIONS, query).await?;
        docs.into_iter()
            .map(|doc| models::from_document(doc).map_err(CoreError::from))
            .collect()
    }
}

fn last_seven_days(today: NaiveDate) -> Vec<Bucket> {
    (0..7)
        .rev()
        .map(|i| {
            let day = today - Duration::days(i);
            Bucket::new(
                day.format("%Y-%m-%d").to_string(),
                day.format("%a").to_string(),
            )
        })
        .collect()
}

fn last_twelve_months(today: NaiveDate) -> Vec<Bucket> {
    (0..12)
        .rev()
        .map(|i| {
            let month = today - Months::new(i);
            let label = month.format("%b %y").to_string();
            Bucket::new(label.clone(), label)
        })
        .collect()
}

/// Accumulate each transaction into the bucket matching its calendar
/// key. A transaction whose key falls outside the materialized range
/// contributes to no bucket but stays in the flat list.
fn fold<F>(buckets: &mut Vec<Bucket>, transactions: &[Transaction], key: F)
where
    F: Fn(&Transaction) -> String,
{
    for tx in transactions {
        let tx_key = key(tx);
        if let Some(bucket) = buckets.iter_mut().find(|b| b.key == tx_key) {
            match tx.kind {
                TransactionKind::Income => bucket.income += tx.amount,
                TransactionKind::Expense => bucket.expense += tx.amount,
            }
        }
    }
}

/// Paired series: per bucket a labeled income point, then the unlabeled
/// expense point rendered as the adjacent bar.
fn report(buckets: Vec<Bucket>, transactions: Vec<Transaction>) -> StatsReport {
    let points = buckets
        .into_iter()
        .flat_map(|bucket| {
            [
                ChartPoint { value: bucket.income, label: Some(bucket.label) },
                ChartPoint { value: bucket.expense, label: None },
            ]
        })
        .collect();
    StatsReport { points, transactions }
}
