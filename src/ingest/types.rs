// src/ingest/types.rs
use anyhow::Result;

use crate::errors::DataError;
pub use crate::model::RawItem;

/// One provider's output: readable items plus the elements that failed to parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBatch {
    pub items: Vec<RawItem>,
    pub rejected: Vec<DataError>,
}

impl SourceBatch {
    /// All items, or the first rejected element as an error.
    pub fn into_strict(self) -> Result<Vec<RawItem>> {
        match self.rejected.into_iter().next() {
            Some(e) => Err(e.into()),
            None => Ok(self.items),
        }
    }
}

impl From<Vec<RawItem>> for SourceBatch {
    fn from(items: Vec<RawItem>) -> Self {
        Self {
            items,
            rejected: Vec::new(),
        }
    }
}

/// Produces a finite batch of raw items. How they are obtained is up to the provider.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>>;

    /// Per-record view of a fetch. Providers that can isolate bad elements
    /// override this; the default treats the fetch as all-or-nothing.
    async fn fetch_batch(&self) -> Result<SourceBatch> {
        Ok(self.fetch_latest().await?.into())
    }

    fn name(&self) -> &'static str;
}
