use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// A single bar in a chart series.
///
/// Buckets come out as pairs: a labeled income point followed by an
/// unlabeled expense point rendered as the adjacent bar. The core
/// computes the numbers — the frontend only renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub value: f64,

    /// Bucket display label, carried on the income point of each pair.
    #[serde(default)]
    pub label: Option<String>,
}

/// Result of one stats aggregation: the paired income/expense series
/// plus the flat list of transactions it was folded from, for
/// incidental display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub points: Vec<ChartPoint>,
    pub transactions: Vec<Transaction>,
}
