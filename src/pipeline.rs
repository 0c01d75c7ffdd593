// src/pipeline.rs
//! Driver: Source → Classifier → Aggregator → Sink.
//!
//! The batch-level policy for data errors lives here; the core only reports them.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use metrics::gauge;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregator::{aggregate, aggregate_lenient};
use crate::classifier::Classifier;
use crate::errors::DataError;
use crate::ingest::{self, types::SourceProvider};
use crate::model::{AggregateRow, RawItem};
use crate::sink::RowSink;

/// What to do when a record cannot be bucketed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataErrorPolicy {
    /// Report the record, leave it out, keep going.
    #[default]
    Skip,
    /// Fail the run on the first bad record.
    Abort,
}

impl FromStr for DataErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(DataErrorPolicy::Skip),
            "abort" => Ok(DataErrorPolicy::Abort),
            other => Err(anyhow::anyhow!(
                "unknown data error policy `{other}` (expected skip|abort)"
            )),
        }
    }
}

impl fmt::Display for DataErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataErrorPolicy::Skip => "skip",
            DataErrorPolicy::Abort => "abort",
        })
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub items: usize,
    /// Items dropped during ingest normalization / platform filtering.
    pub filtered: usize,
    pub records: usize,
    pub rows: Vec<AggregateRow>,
    /// Records left out under [`DataErrorPolicy::Skip`]: unreadable source
    /// elements first, then records the aggregator could not bucket.
    pub rejected: Vec<DataError>,
    /// Providers that failed outright while others still delivered.
    pub failed_providers: Vec<String>,
}

/// Classify and aggregate an in-memory batch.
pub fn process_items(
    classifier: &Classifier,
    items: &[RawItem],
    policy: DataErrorPolicy,
) -> Result<RunReport, DataError> {
    let records = classifier.classify_batch(items);
    let (rows, rejected) = match policy {
        DataErrorPolicy::Abort => (aggregate(&records)?, Vec::new()),
        DataErrorPolicy::Skip => aggregate_lenient(&records),
    };
    Ok(RunReport {
        items: items.len(),
        filtered: 0,
        records: records.len(),
        rows,
        rejected,
        failed_providers: Vec::new(),
    })
}

/// Fetch from all providers, then classify and aggregate.
///
/// Fails when every provider failed, so a broken source never reads as an
/// empty batch. Unreadable source elements follow `policy` like any other
/// data error.
pub async fn run_once(
    providers: &[Box<dyn SourceProvider>],
    allowlist: &[String],
    classifier: &Classifier,
    policy: DataErrorPolicy,
) -> Result<RunReport> {
    let fetched = ingest::run_once(providers, allowlist).await;
    if !providers.is_empty() && fetched.failed_providers.len() == providers.len() {
        anyhow::bail!(
            "every source failed: {}",
            fetched.failed_providers.join("; ")
        );
    }
    if policy == DataErrorPolicy::Abort {
        if let Some(e) = fetched.rejected.first() {
            return Err(e.clone().into());
        }
    }

    let mut report = process_items(classifier, &fetched.items, policy)?;
    report.filtered = fetched.filtered;
    report.failed_providers = fetched.failed_providers;
    let mut rejected = fetched.rejected;
    rejected.append(&mut report.rejected);
    report.rejected = rejected;

    let now = chrono::Utc::now().timestamp().max(0);
    gauge!("pipeline_last_run_ts").set(now as f64);

    for e in &report.rejected {
        warn!(target: "pipeline", record = %e.record_id(), error = %e, "record rejected");
    }
    info!(
        target: "pipeline",
        items = report.items,
        filtered = report.filtered,
        records = report.records,
        rows = report.rows.len(),
        rejected = report.rejected.len(),
        failed_providers = report.failed_providers.len(),
        policy = %policy,
        "pipeline run complete"
    );
    Ok(report)
}

/// [`run_once`] followed by handing the rows to `sink`.
pub async fn run_and_store(
    providers: &[Box<dyn SourceProvider>],
    allowlist: &[String],
    classifier: &Classifier,
    policy: DataErrorPolicy,
    sink: &dyn RowSink,
) -> Result<RunReport> {
    let report = run_once(providers, allowlist, classifier, policy).await?;
    sink.store(&report.rows).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::KeywordDictionary;
    use std::sync::Arc;

    fn classifier() -> Classifier {
        let dict = KeywordDictionary::from_json_str(r#"{"violence": {"EN": ["war"]}}"#).unwrap();
        Classifier::new(Arc::new(dict))
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Skip".parse::<DataErrorPolicy>().unwrap(), DataErrorPolicy::Skip);
        assert_eq!(" abort ".parse::<DataErrorPolicy>().unwrap(), DataErrorPolicy::Abort);
        assert!("ignore".parse::<DataErrorPolicy>().is_err());
    }

    #[test]
    fn policy_decides_on_bad_timestamps() {
        let items = vec![
            RawItem::new("war", "Forum", "2024-01-16T10:00:00Z", "EN", None),
            RawItem::new("war again", "Forum", "last tuesday", "EN", None),
        ];
        let c = classifier();

        let report = process_items(&c, &items, DataErrorPolicy::Skip).unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rejected.len(), 1);

        let err = process_items(&c, &items, DataErrorPolicy::Abort).unwrap_err();
        assert_eq!(err.record_id(), items[1].fingerprint());
    }
}
