// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::errors::DataError;
use crate::ingest::types::{RawItem, SourceProvider};
use crate::telemetry::ensure_metrics_described;
use metrics::counter;

/// Normalize text: decode entities, strip tags, fold quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. NBSP)
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 2000 chars
    if out.chars().count() > 2000 {
        out = out.chars().take(2000).collect();
    }

    out
}

pub fn is_allowed_platform<S: AsRef<str>>(platform: S, allowlist: &[String]) -> bool {
    let p = platform.as_ref();
    allowlist.iter().any(|w| w.eq_ignore_ascii_case(p))
}

/// Normalize item text and drop empties / platforms outside the allowlist
/// (an empty allowlist admits every platform). Returns (kept, filtered_count).
pub fn normalize_and_filter(raw_items: Vec<RawItem>, allowlist: &[String]) -> (Vec<RawItem>, usize) {
    let mut filtered_out = 0usize;
    let mut kept = Vec::with_capacity(raw_items.len());
    for mut item in raw_items {
        item.text = normalize_text(&item.text);
        let keep = !item.text.is_empty()
            && (allowlist.is_empty() || is_allowed_platform(&item.platform, allowlist));
        if !keep {
            filtered_out += 1;
            continue;
        }
        kept.push(item);
    }
    (kept, filtered_out)
}

/// What one ingest pass produced.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Normalized items that passed the filter.
    pub items: Vec<RawItem>,
    /// Items dropped as empty or outside the allowlist.
    pub filtered: usize,
    /// Source elements that could not be read as items.
    pub rejected: Vec<DataError>,
    /// `provider: error` for each provider whose fetch failed outright.
    pub failed_providers: Vec<String>,
}

/// Fetch once from every provider, then normalize + filter.
/// A failing provider is logged and recorded; the others still contribute.
pub async fn run_once(providers: &[Box<dyn SourceProvider>], allowlist: &[String]) -> IngestReport {
    ensure_metrics_described();

    let mut raw = Vec::new();
    let mut rejected = Vec::new();
    let mut failed_providers = Vec::new();
    for p in providers {
        match p.fetch_batch().await {
            Ok(mut batch) => {
                tracing::debug!(
                    target: "ingest",
                    provider = p.name(),
                    items = batch.items.len(),
                    rejected = batch.rejected.len(),
                    "provider fetched"
                );
                raw.append(&mut batch.items);
                rejected.append(&mut batch.rejected);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                failed_providers.push(format!("{}: {e:#}", p.name()));
            }
        }
    }
    counter!("ingest_events_total").increment(raw.len() as u64);
    counter!("ingest_rejected_total").increment(rejected.len() as u64);

    let (items, filtered) = normalize_and_filter(raw, allowlist);

    counter!("ingest_kept_total").increment(items.len() as u64);
    counter!("ingest_filtered_total").increment(filtered as u64);

    IngestReport {
        items,
        filtered,
        rejected,
        failed_providers,
    }
}
