// src/aggregator.rs
//! Groups classification records by (location, location kind, ISO week, platform,
//! category) and counts them.
//!
//! Records are validated before anything is counted, so a bad record never leaves
//! partial counts behind. Counting itself is a parallel fold over `BTreeMap`
//! partials merged by plain addition; `BTreeMap` keeps the output sorted by the
//! grouping tuple.

use std::collections::BTreeMap;

use metrics::counter;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::errors::DataError;
use crate::model::{AggregateRow, ClassificationRecord, LocationKind};
use crate::telemetry::ensure_metrics_described;
use crate::week::{iso_week_bucket, parse_timestamp_date};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey<'a> {
    location: &'a str,
    kind: LocationKind,
    week: String,
    platform: &'a str,
    category: &'a str,
}

impl<'a> GroupKey<'a> {
    fn from_record(rec: &'a ClassificationRecord) -> Result<Self, DataError> {
        let location = rec.location.value();
        if location.trim().is_empty() {
            return Err(DataError::Location {
                record_id: rec.item_id.clone(),
            });
        }
        let date = parse_timestamp_date(&rec.timestamp).ok_or_else(|| DataError::Timestamp {
            record_id: rec.item_id.clone(),
            timestamp: rec.timestamp.clone(),
        })?;
        Ok(Self {
            location,
            kind: rec.location.kind(),
            week: iso_week_bucket(date).to_string(),
            platform: &rec.platform,
            category: &rec.category,
        })
    }
}

type Partial<'a> = BTreeMap<GroupKey<'a>, u64>;

fn count_keys<'a>(keys: &[GroupKey<'a>]) -> Partial<'a> {
    keys.par_iter()
        .fold(Partial::new, |mut acc, key| {
            *acc.entry(key.clone()).or_insert(0) += 1;
            acc
        })
        .reduce(Partial::new, |mut left, right| {
            for (k, n) in right {
                *left.entry(k).or_insert(0) += n;
            }
            left
        })
}

fn into_rows(counts: Partial<'_>) -> Vec<AggregateRow> {
    let rows: Vec<AggregateRow> = counts
        .into_iter()
        .map(|(k, count)| AggregateRow {
            location: k.location.to_string(),
            location_type: k.kind,
            week: k.week,
            platform: k.platform.to_string(),
            category: k.category.to_string(),
            count,
        })
        .collect();
    counter!("aggregate_rows_total").increment(rows.len() as u64);
    rows
}

/// Strict aggregation: the first record that cannot be bucketed aborts the whole
/// call with a [`DataError`] naming it. Nothing is counted in that case.
pub fn aggregate(records: &[ClassificationRecord]) -> Result<Vec<AggregateRow>, DataError> {
    ensure_metrics_described();
    let keys = records
        .iter()
        .map(GroupKey::from_record)
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| {
            counter!("aggregate_rejected_total").increment(1);
            warn!(target: "aggregator", record = %e.record_id(), error = %e, "aggregation aborted");
        })?;

    let rows = into_rows(count_keys(&keys));
    debug!(target: "aggregator", records = records.len(), rows = rows.len(), "aggregated");
    Ok(rows)
}

/// Skip-and-continue aggregation: invalid records are returned as errors (in input
/// order) and excluded; every valid record is counted.
pub fn aggregate_lenient(records: &[ClassificationRecord]) -> (Vec<AggregateRow>, Vec<DataError>) {
    ensure_metrics_described();
    let mut keys = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for rec in records {
        match GroupKey::from_record(rec) {
            Ok(k) => keys.push(k),
            Err(e) => {
                warn!(target: "aggregator", record = %e.record_id(), error = %e, "record skipped");
                rejected.push(e);
            }
        }
    }
    counter!("aggregate_rejected_total").increment(rejected.len() as u64);

    let rows = into_rows(count_keys(&keys));
    debug!(
        target: "aggregator",
        records = records.len(),
        rejected = rejected.len(),
        rows = rows.len(),
        "aggregated (lenient)"
    );
    (rows, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;

    fn rec(id: &str, ts: &str, loc: Location, platform: &str, category: &str) -> ClassificationRecord {
        ClassificationRecord {
            item_id: id.into(),
            platform: platform.into(),
            timestamp: ts.into(),
            language: "EN".into(),
            location: loc,
            category: category.into(),
            keyword: "kw".into(),
        }
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(aggregate(&[]).unwrap().is_empty());
        let (rows, bad) = aggregate_lenient(&[]);
        assert!(rows.is_empty() && bad.is_empty());
    }

    #[test]
    fn same_group_is_counted_together() {
        let recs = vec![
            rec("a", "2024-01-15T08:00:00Z", Location::Region("Ankara".into()), "X", "violence"),
            rec("b", "2024-01-21T23:59:59Z", Location::Region("Ankara".into()), "X", "violence"),
            rec("c", "2024-01-22T00:00:00Z", Location::Region("Ankara".into()), "X", "violence"),
        ];
        let rows = aggregate(&recs).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].week.as_str(), rows[0].count), ("2024-W03", 2));
        assert_eq!((rows[1].week.as_str(), rows[1].count), ("2024-W04", 1));
    }

    #[test]
    fn region_and_fallback_never_merge() {
        // Same value string under both kinds still yields two rows.
        let recs = vec![
            rec("a", "2024-01-16", Location::Region("EN".into()), "X", "c"),
            rec("b", "2024-01-16", Location::LanguageFallback("EN".into()), "X", "c"),
        ];
        let rows = aggregate(&recs).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location_type, LocationKind::Region);
        assert_eq!(rows[1].location_type, LocationKind::LanguageFallback);
    }

    #[test]
    fn bad_timestamp_aborts_strict_and_names_record() {
        let recs = vec![
            rec("ok", "2024-01-16", Location::Region("A".into()), "X", "c"),
            rec("broken-7", "sometime", Location::Region("A".into()), "X", "c"),
        ];
        let err = aggregate(&recs).unwrap_err();
        assert_eq!(err.record_id(), "broken-7");
        assert!(matches!(err, DataError::Timestamp { .. }));
    }

    #[test]
    fn lenient_skips_bad_records_and_counts_the_rest() {
        let recs = vec![
            rec("ok1", "2024-01-16", Location::Region("A".into()), "X", "c"),
            rec("bad", "", Location::Region("A".into()), "X", "c"),
            rec("noloc", "2024-01-16", Location::LanguageFallback(" ".into()), "X", "c"),
            rec("ok2", "2024-01-17", Location::Region("A".into()), "X", "c"),
        ];
        let (rows, bad) = aggregate_lenient(&recs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 2);
        let ids: Vec<_> = bad.iter().map(|e| e.record_id()).collect();
        assert_eq!(ids, ["bad", "noloc"]);
        assert!(matches!(bad[1], DataError::Location { .. }));
    }

    #[test]
    fn output_is_sorted_by_grouping_tuple() {
        let recs = vec![
            rec("1", "2024-01-16", Location::Region("Zonguldak".into()), "B", "c"),
            rec("2", "2024-01-16", Location::Region("Ankara".into()), "B", "c"),
            rec("3", "2024-01-16", Location::Region("Ankara".into()), "A", "c"),
        ];
        let rows = aggregate(&recs).unwrap();
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.location.as_str(), r.platform.as_str()))
            .collect();
        assert_eq!(keys, [("Ankara", "A"), ("Ankara", "B"), ("Zonguldak", "B")]);
    }
}
