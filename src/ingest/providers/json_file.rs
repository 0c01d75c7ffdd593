// src/ingest/providers/json_file.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::errors::DataError;
use crate::ingest::types::{RawItem, SourceBatch, SourceProvider};

/// Reads items from a JSON array file, or JSON Lines for `.jsonl` / `.ndjson`.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json_lines(&self) -> bool {
        matches!(
            self.path
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.to_ascii_lowercase())
                .as_deref(),
            Some("jsonl" | "ndjson")
        )
    }
}

/// Element → item. A bad element is named by its `id`, else `origin#n` (1-based).
fn item_from_value(value: Value, origin: &str, n: usize) -> Result<RawItem, DataError> {
    let record_id = value
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{origin}#{n}"));
    serde_json::from_value(value).map_err(|e| DataError::Malformed {
        record_id,
        reason: e.to_string(),
    })
}

/// Parse a JSON array of items. Only a document that is not an array at all
/// fails; bad elements land in `rejected`.
pub fn parse_json_array(s: &str, origin: &str) -> Result<SourceBatch> {
    let values: Vec<Value> = serde_json::from_str(s).context("parsing items json array")?;
    let mut batch = SourceBatch::default();
    for (i, value) in values.into_iter().enumerate() {
        match item_from_value(value, origin, i + 1) {
            Ok(item) => batch.items.push(item),
            Err(e) => batch.rejected.push(e),
        }
    }
    Ok(batch)
}

/// Parse JSON Lines; blank lines are ignored, a bad line is rejected under its line number.
pub fn parse_json_lines(s: &str, origin: &str) -> SourceBatch {
    let mut batch = SourceBatch::default();
    for (i, line) in s.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = serde_json::from_str::<Value>(line)
            .map_err(|e| DataError::Malformed {
                record_id: format!("{origin}#{}", i + 1),
                reason: e.to_string(),
            })
            .and_then(|v| item_from_value(v, origin, i + 1));
        match parsed {
            Ok(item) => batch.items.push(item),
            Err(e) => batch.rejected.push(e),
        }
    }
    batch
}

#[async_trait]
impl SourceProvider for JsonFileProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>> {
        self.fetch_batch()
            .await?
            .into_strict()
            .with_context(|| format!("in {}", self.path.display()))
    }

    async fn fetch_batch(&self) -> Result<SourceBatch> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading items from {}", self.path.display()))?;
        let origin = self.path.display().to_string();
        if self.is_json_lines() {
            Ok(parse_json_lines(&content, &origin))
        } else {
            parse_json_array(&content, &origin).with_context(|| format!("in {origin}"))
        }
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
