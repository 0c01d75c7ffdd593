// src/sink.rs
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::model::AggregateRow;

#[async_trait::async_trait]
pub trait RowSink: Send + Sync {
    /// Persist one run's rows. Row order carries no meaning.
    async fn store(&self, rows: &[AggregateRow]) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Pretty UTF-8 JSON array; non-ASCII is written literally, not `\u` escaped.
pub fn rows_to_json(rows: &[AggregateRow]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("serializing aggregate rows")
}

/// Writes the rows as a JSON array to a file, replacing previous content.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl RowSink for JsonFileSink {
    async fn store(&self, rows: &[AggregateRow]) -> Result<()> {
        let body = rows_to_json(rows)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("writing results to {}", self.path.display()))?;
        tracing::info!(target: "sink", path = %self.path.display(), rows = rows.len(), "results saved");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

// --- Test helper ---
pub struct MemorySink {
    pub calls: std::sync::Mutex<Vec<Vec<AggregateRow>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            calls: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RowSink for MemorySink {
    async fn store(&self, rows: &[AggregateRow]) -> Result<()> {
        self.calls
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink mutex poisoned"))?
            .push(rows.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocationKind;

    #[test]
    fn json_keeps_unicode_literal() {
        let rows = vec![AggregateRow {
            location: "Gaziantep".into(),
            location_type: LocationKind::Region,
            week: "2024-W03".into(),
            platform: "SocialSite".into(),
            category: "şiddet".into(),
            count: 1,
        }];
        let s = rows_to_json(&rows).unwrap();
        assert!(s.contains("\"şiddet\""));
        assert!(!s.contains("\\u"));
        assert!(s.trim_start().starts_with('['));
    }
}
